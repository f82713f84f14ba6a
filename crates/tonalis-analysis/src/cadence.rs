//! Cadence and six-four classification.
//!
//! [`detect_detailed`] classifies one transition between labeled chords.
//! [`detect_sequence`] walks a whole progression and consolidates cadential
//! six-fours into the cadence they decorate, so an `I64 → V → I` produces
//! one record rather than two.

use tonalis_theory::{
    AnalyzedChord, CadenceInfo, CadenceType, Figure, FourPartVoicing, HarmonyOptions, Key,
    ScaleDegree, SixFourType,
};

/// A labeled chord with its optional voicing.
#[derive(Debug, Clone, Copy)]
pub struct CadenceStep<'a> {
    pub chord: &'a AnalyzedChord,
    pub voicing: Option<&'a FourPartVoicing>,
}

impl<'a> CadenceStep<'a> {
    pub fn new(chord: &'a AnalyzedChord, voicing: Option<&'a FourPartVoicing>) -> Self {
        Self { chord, voicing }
    }

    pub fn unvoiced(chord: &'a AnalyzedChord) -> Self {
        Self {
            chord,
            voicing: None,
        }
    }
}

/// Labeled, not secondary, with the given base degree.
fn is_plain_degree(chord: &AnalyzedChord, degree: ScaleDegree) -> bool {
    chord.success && !chord.is_secondary() && chord.roman.map(|r| r.degree) == Some(degree)
}

/// A non-secondary major V in any inversion or extension.
fn is_dominant_v(chord: &AnalyzedChord) -> bool {
    is_plain_degree(chord, ScaleDegree::V)
        && !chord.is_flat_degree()
        && chord.roman.map(|r| r.upper).unwrap_or(false)
}

/// V, or a leading-tone chord when those count as dominants.
fn is_cadential_dominant(chord: &AnalyzedChord, options: &HarmonyOptions) -> bool {
    let leading_tone = options.treat_leading_tone_seventh_as_dominant
        && is_plain_degree(chord, ScaleDegree::VII)
        && !chord.is_flat_degree()
        && chord.roman.map(|r| !r.upper).unwrap_or(false);
    is_dominant_v(chord) || leading_tone
}

fn is_tonic(chord: &AnalyzedChord) -> bool {
    is_plain_degree(chord, ScaleDegree::I)
}

fn is_tonic_six_four(chord: &AnalyzedChord) -> bool {
    is_tonic(chord) && chord.figure == Some(Figure::SixFour)
}

fn is_deceptive_goal(chord: &AnalyzedChord, options: &HarmonyOptions) -> bool {
    is_plain_degree(chord, ScaleDegree::VI)
        && (!chord.is_flat_degree() || options.allow_deceptive_to_borrowed_submediant)
}

/// Classify the transition `prev → curr`.
///
/// `prev_prev` is the chord before `prev`; it is only read for passing and
/// pedal six-fours, where `prev` is the six-four chord. `index_from` is the
/// index of `prev` and becomes the record's `index_from`.
pub fn detect_detailed(
    index_from: usize,
    prev_prev: Option<&AnalyzedChord>,
    prev: CadenceStep<'_>,
    curr: CadenceStep<'_>,
    key: Key,
    options: &HarmonyOptions,
) -> CadenceInfo {
    let (p, c) = (prev.chord, curr.chord);

    if is_cadential_dominant(p, options) {
        if is_tonic(c) {
            let mut info = CadenceInfo::cadence(index_from, CadenceType::Authentic);
            info.is_perfect_authentic = is_perfect(prev, curr, key, options);
            return info;
        }
        if is_deceptive_goal(c, options) {
            return CadenceInfo::cadence(index_from, CadenceType::Deceptive);
        }
    }

    if is_plain_degree(p, ScaleDegree::IV)
        && !p.is_flat_degree()
        && is_tonic(c)
        && !is_tonic_six_four(c)
    {
        return CadenceInfo::cadence(index_from, CadenceType::Plagal);
    }

    if is_cadential_dominant(c, options) && !is_cadential_dominant(p, options) {
        if is_tonic_six_four(p) {
            return CadenceInfo::six_four(index_from, SixFourType::Cadential);
        }
        return CadenceInfo::cadence(index_from, CadenceType::Half);
    }

    match prev_prev.and_then(|pp| non_cadential_six_four(pp, p, c)) {
        Some(kind) => CadenceInfo::six_four(index_from, kind),
        None => CadenceInfo::none(index_from),
    }
}

/// Perfect authentic refinement of an authentic `prev → curr`.
fn is_perfect(
    prev: CadenceStep<'_>,
    curr: CadenceStep<'_>,
    key: Key,
    options: &HarmonyOptions,
) -> bool {
    let dominant_ok = match prev.chord.roman_text.as_str() {
        "V" => true,
        "V7" | "V9" | "V7(9)" => !options.strict_pac_disallow_dominant_extensions,
        _ => false,
    };
    let goal_ok = match curr.chord.figure {
        Some(Figure::Root) => true,
        Some(Figure::Seven) => !options.strict_pac_plain_triads_only,
        _ => false,
    };
    if !dominant_ok || !goal_ok {
        return false;
    }

    if options.requires_soprano_tonic() {
        match curr.voicing {
            Some(v) if v.soprano_pc() == key.tonic() => {}
            _ => return false,
        }
    }

    if options.strict_pac_require_soprano_leading_tone_resolution {
        match (prev.voicing, curr.voicing) {
            (Some(from), Some(to)) => {
                let rises_by_step = to.soprano as i32 - from.soprano as i32 == 1;
                if from.soprano_pc() != key.leading_tone() || !rises_by_step {
                    return false;
                }
            }
            _ => return false,
        }
    }

    true
}

/// Passing or pedal six-four for `before → six_four → after` over one harmony.
fn non_cadential_six_four(
    before: &AnalyzedChord,
    six_four: &AnalyzedChord,
    after: &AnalyzedChord,
) -> Option<SixFourType> {
    if !six_four.is_six_four() || !before.success || !after.success {
        return None;
    }
    let pcs = six_four.pitch_classes;
    if before.pitch_classes != pcs || after.pitch_classes != pcs {
        return None;
    }
    match (before.figure?, after.figure?) {
        (a, b) if a == b => Some(SixFourType::Pedal),
        (Figure::Root, Figure::Six) | (Figure::Six, Figure::Root) => Some(SixFourType::Passing),
        _ => None,
    }
}

/// Cadence records for a progression, plus the indices of cadential
/// six-four chords (for relabeling).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CadenceSequence {
    pub cadences: Vec<CadenceInfo>,
    pub cadential_six_fours: Vec<usize>,
}

/// Consolidation state for a cadential six-four.
#[derive(Debug, Clone, Copy)]
enum SixFourState {
    AwaitingSixFour,
    /// An `I64 → V` step is held until the dominant resolves.
    PendingResolution {
        record: CadenceInfo,
        six_four_index: usize,
    },
    /// The held step was just written out with its cadence. The next step
    /// starts from scratch.
    Emitted,
}

/// Classify every transition of `chords` and consolidate six-fours.
///
/// `voicings[i]` belongs to `chords[i]`; a shorter slice leaves the
/// remaining chords unvoiced.
pub fn detect_sequence(
    chords: &[AnalyzedChord],
    voicings: &[FourPartVoicing],
    key: Key,
    options: &HarmonyOptions,
) -> CadenceSequence {
    let mut out = CadenceSequence::default();
    let mut state = SixFourState::AwaitingSixFour;

    for i in 1..chords.len() {
        let prev = CadenceStep::new(&chords[i - 1], voicings.get(i - 1));
        let curr = CadenceStep::new(&chords[i], voicings.get(i));
        let prev_prev = i.checked_sub(2).map(|j| &chords[j]);
        let info = detect_detailed(i - 1, prev_prev, prev, curr, key, options);

        state = match state {
            SixFourState::PendingResolution {
                record,
                six_four_index,
            } => {
                if info.is_cadence() {
                    out.cadences.push(CadenceInfo {
                        has_cadential_six_four: true,
                        six_four: SixFourType::Cadential,
                        ..info
                    });
                    out.cadential_six_fours.push(six_four_index);
                    SixFourState::Emitted
                } else if is_cadential_dominant(prev.chord, options)
                    && is_cadential_dominant(curr.chord, options)
                {
                    SixFourState::PendingResolution {
                        record,
                        six_four_index,
                    }
                } else {
                    out.cadences.push(record);
                    out.cadential_six_fours.push(six_four_index);
                    accept(&mut out, info, options)
                }
            }
            SixFourState::AwaitingSixFour | SixFourState::Emitted => {
                accept(&mut out, info, options)
            }
        };
    }

    if let SixFourState::PendingResolution {
        record,
        six_four_index,
    } = state
    {
        out.cadences.push(record);
        out.cadential_six_fours.push(six_four_index);
    }

    out
}

/// Handle a record while no six-four is pending.
fn accept(out: &mut CadenceSequence, info: CadenceInfo, options: &HarmonyOptions) -> SixFourState {
    if info.six_four == SixFourType::Cadential && !info.is_cadence() {
        return SixFourState::PendingResolution {
            record: info,
            six_four_index: info.index_from,
        };
    }
    let hidden = matches!(info.six_four, SixFourType::Passing | SixFourType::Pedal)
        && !options.show_non_cadential_six_four;
    if info.is_reportable() && !hidden {
        out.cadences.push(info);
    }
    SixFourState::AwaitingSixFour
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labeler::{analyze, ChordContext};
    use pretty_assertions::assert_eq;
    use tonalis_theory::PitchClassSet;

    const C: Key = Key::major(0);

    fn chord(pcs: &[i32], bass: Option<u8>) -> AnalyzedChord {
        let context = ChordContext {
            bass_hint: bass,
            ..ChordContext::default()
        };
        analyze(
            &PitchClassSet::from_pcs(pcs.iter().copied()),
            C,
            &HarmonyOptions::default(),
            &context,
        )
    }

    fn tonic() -> AnalyzedChord {
        chord(&[0, 4, 7], None)
    }

    fn dominant() -> AnalyzedChord {
        chord(&[7, 11, 2], None)
    }

    fn detect(prev: &AnalyzedChord, curr: &AnalyzedChord) -> CadenceInfo {
        detect_detailed(
            0,
            None,
            CadenceStep::unvoiced(prev),
            CadenceStep::unvoiced(curr),
            C,
            &HarmonyOptions::default(),
        )
    }

    #[test]
    fn test_authentic_and_perfect() {
        let info = detect(&dominant(), &tonic());
        assert_eq!(info.cadence_type, CadenceType::Authentic);
        assert!(info.is_perfect_authentic);

        let v7 = chord(&[7, 11, 2, 5], None);
        assert!(detect(&v7, &tonic()).is_perfect_authentic);

        let i6 = chord(&[0, 4, 7], Some(4));
        let info = detect(&dominant(), &i6);
        assert_eq!(info.cadence_type, CadenceType::Authentic);
        assert!(!info.is_perfect_authentic);

        let v6 = chord(&[7, 11, 2], Some(11));
        assert!(!detect(&v6, &tonic()).is_perfect_authentic);
    }

    #[test]
    fn test_leading_tone_authentic() {
        let vii = chord(&[11, 2, 5], Some(2));
        let info = detect(&vii, &tonic());
        assert_eq!(info.cadence_type, CadenceType::Authentic);
        assert!(!info.is_perfect_authentic);

        let options = HarmonyOptions::default().with_treat_leading_tone_seventh_as_dominant(false);
        let info = detect_detailed(
            0,
            None,
            CadenceStep::unvoiced(&vii),
            CadenceStep::unvoiced(&tonic()),
            C,
            &options,
        );
        assert_eq!(info.cadence_type, CadenceType::None);
    }

    #[test]
    fn test_plagal_deceptive_half() {
        let iv = chord(&[5, 9, 0], None);
        assert_eq!(detect(&iv, &tonic()).cadence_type, CadenceType::Plagal);
        let minor_iv = chord(&[5, 8, 0], None);
        assert_eq!(detect(&minor_iv, &tonic()).cadence_type, CadenceType::Plagal);

        let vi = chord(&[9, 0, 4], None);
        assert_eq!(detect(&dominant(), &vi).cadence_type, CadenceType::Deceptive);
        let flat_vi = chord(&[8, 0, 3], None);
        assert_eq!(
            detect(&dominant(), &flat_vi).cadence_type,
            CadenceType::Deceptive
        );

        let i64 = chord(&[0, 4, 7], Some(7));
        assert_eq!(detect(&iv, &i64).cadence_type, CadenceType::None);

        assert_eq!(detect(&iv, &dominant()).cadence_type, CadenceType::Half);
        assert_eq!(detect(&dominant(), &dominant()).cadence_type, CadenceType::None);
    }

    #[test]
    fn test_half_on_leading_tone_goal() {
        let vii6 = chord(&[11, 2, 5], Some(2));
        let info = detect(&tonic(), &vii6);
        assert_eq!(info.cadence_type, CadenceType::Half);
        assert_eq!(info.six_four, SixFourType::None);

        let vii7 = chord(&[11, 2, 5, 9], None);
        let iv = chord(&[5, 9, 0], None);
        assert_eq!(detect(&iv, &vii7).cadence_type, CadenceType::Half);

        // Dominant prolongations are not half cadences.
        assert_eq!(detect(&dominant(), &vii6).cadence_type, CadenceType::None);
        assert_eq!(detect(&vii6, &dominant()).cadence_type, CadenceType::None);

        let options = HarmonyOptions::default().with_treat_leading_tone_seventh_as_dominant(false);
        let info = detect_detailed(
            0,
            None,
            CadenceStep::unvoiced(&tonic()),
            CadenceStep::unvoiced(&vii6),
            C,
            &options,
        );
        assert_eq!(info.cadence_type, CadenceType::None);
    }

    #[test]
    fn test_secondary_dominant_is_not_cadential() {
        let v_of_v = chord(&[2, 6, 9], None);
        assert_eq!(detect(&v_of_v, &dominant()).cadence_type, CadenceType::Half);
        let v_of_ii = chord(&[9, 1, 4], None);
        let ii = chord(&[2, 5, 9], None);
        assert_eq!(detect(&v_of_ii, &ii).cadence_type, CadenceType::None);
    }

    #[test]
    fn test_cadential_six_four_step() {
        let i64 = chord(&[0, 4, 7], Some(7));
        let info = detect(&i64, &dominant());
        assert_eq!(info.cadence_type, CadenceType::None);
        assert_eq!(info.six_four, SixFourType::Cadential);
    }

    #[test]
    fn test_soprano_requirements() {
        let options = HarmonyOptions::default().with_strict_pac_require_soprano_tonic(true);
        let v_voicing = FourPartVoicing::parse("B4 G4 D4 G2").unwrap();
        let i_voicing = FourPartVoicing::parse("C5 G4 E4 C3").unwrap();
        let i_voicing_e = FourPartVoicing::parse("E5 G4 C4 C3").unwrap();

        let run = |options: &HarmonyOptions, v: Option<&FourPartVoicing>, i: Option<&FourPartVoicing>| {
            detect_detailed(
                0,
                None,
                CadenceStep::new(&dominant(), v),
                CadenceStep::new(&tonic(), i),
                C,
                options,
            )
            .is_perfect_authentic
        };

        assert!(run(&options, Some(&v_voicing), Some(&i_voicing)));
        assert!(!run(&options, Some(&v_voicing), Some(&i_voicing_e)));
        assert!(!run(&options, None, None));

        let lt = HarmonyOptions::default()
            .with_strict_pac_require_soprano_leading_tone_resolution(true);
        assert!(run(&lt, Some(&v_voicing), Some(&i_voicing)));
        let d_soprano = FourPartVoicing::parse("D5 G4 B3 G2").unwrap();
        assert!(!run(&lt, Some(&d_soprano), Some(&i_voicing)));
    }

    #[test]
    fn test_strict_extension_flags() {
        let v7 = chord(&[7, 11, 2, 5], None);
        let imaj7 = chord(&[0, 4, 7, 11], None);
        let strict = HarmonyOptions::default()
            .with_strict_pac_disallow_dominant_extensions(true)
            .with_strict_pac_plain_triads_only(true);
        let run = |p: &AnalyzedChord, c: &AnalyzedChord, o: &HarmonyOptions| {
            detect_detailed(
                0,
                None,
                CadenceStep::unvoiced(p),
                CadenceStep::unvoiced(c),
                C,
                o,
            )
        };

        assert!(run(&v7, &imaj7, &HarmonyOptions::default()).is_perfect_authentic);
        let info = run(&v7, &imaj7, &strict);
        assert_eq!(info.cadence_type, CadenceType::Authentic);
        assert!(!info.is_perfect_authentic);
        assert!(run(&dominant(), &tonic(), &strict).is_perfect_authentic);
    }

    #[test]
    fn test_sequence_consolidates_cadential_six_four() {
        let chords = vec![chord(&[0, 4, 7], Some(7)), dominant(), tonic()];
        let seq = detect_sequence(&chords, &[], C, &HarmonyOptions::default());
        assert_eq!(
            seq.cadences,
            vec![CadenceInfo {
                index_from: 1,
                cadence_type: CadenceType::Authentic,
                is_perfect_authentic: true,
                has_cadential_six_four: true,
                six_four: SixFourType::Cadential,
            }]
        );
        assert_eq!(seq.cadential_six_fours, vec![0]);
    }

    #[test]
    fn test_sequence_prolonged_dominant() {
        let v7 = chord(&[7, 11, 2, 5], None);
        let chords = vec![chord(&[0, 4, 7], Some(7)), dominant(), v7, tonic()];
        let seq = detect_sequence(&chords, &[], C, &HarmonyOptions::default());
        assert_eq!(seq.cadences.len(), 1);
        assert_eq!(seq.cadences[0].index_from, 2);
        assert!(seq.cadences[0].has_cadential_six_four);
        assert_eq!(seq.cadential_six_fours, vec![0]);
    }

    #[test]
    fn test_sequence_after_consolidated_cadence() {
        let chords = vec![
            chord(&[0, 4, 7], Some(7)),
            dominant(),
            tonic(),
            dominant(),
            tonic(),
        ];
        let seq = detect_sequence(&chords, &[], C, &HarmonyOptions::default());
        let summary: Vec<(usize, CadenceType, bool)> = seq
            .cadences
            .iter()
            .map(|c| (c.index_from, c.cadence_type, c.has_cadential_six_four))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, CadenceType::Authentic, true),
                (2, CadenceType::Half, false),
                (3, CadenceType::Authentic, false),
            ]
        );
        assert_eq!(seq.cadential_six_fours, vec![0]);
    }

    #[test]
    fn test_sequence_unresolved_six_four_is_emitted_alone() {
        let chords = vec![chord(&[0, 4, 7], Some(7)), dominant(), chord(&[5, 9, 0], None)];
        let seq = detect_sequence(&chords, &[], C, &HarmonyOptions::default());
        assert_eq!(seq.cadences, vec![CadenceInfo::six_four(0, SixFourType::Cadential)]);

        let chords = vec![chord(&[0, 4, 7], Some(7)), dominant()];
        let seq = detect_sequence(&chords, &[], C, &HarmonyOptions::default());
        assert_eq!(seq.cadences, vec![CadenceInfo::six_four(0, SixFourType::Cadential)]);
    }

    #[test]
    fn test_passing_and_pedal_six_fours() {
        let iv = chord(&[5, 9, 0], Some(5));
        let iv64 = chord(&[5, 9, 0], Some(0));
        let iv6 = chord(&[5, 9, 0], Some(9));

        let passing = vec![iv.clone(), iv64.clone(), iv6];
        let seq = detect_sequence(&passing, &[], C, &HarmonyOptions::default());
        assert_eq!(seq.cadences, vec![CadenceInfo::six_four(1, SixFourType::Passing)]);

        let pedal = vec![iv.clone(), iv64, iv];
        let seq = detect_sequence(&pedal, &[], C, &HarmonyOptions::default());
        assert_eq!(seq.cadences, vec![CadenceInfo::six_four(1, SixFourType::Pedal)]);

        let hidden = HarmonyOptions::default().with_show_non_cadential_six_four(false);
        assert!(detect_sequence(&passing, &[], C, &hidden).cadences.is_empty());
        assert!(detect_sequence(&pedal, &[], C, &hidden).cadences.is_empty());
    }

    #[test]
    fn test_different_harmony_is_not_six_four() {
        let chords = vec![
            chord(&[5, 9, 0], Some(5)),
            chord(&[5, 9, 0], Some(0)),
            chord(&[2, 5, 9], Some(5)),
        ];
        let seq = detect_sequence(&chords, &[], C, &HarmonyOptions::default());
        assert!(seq.cadences.is_empty());
    }
}
