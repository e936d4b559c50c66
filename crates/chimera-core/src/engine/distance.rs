use super::config::DistanceConfig;
use super::error::EngineError;
use super::memo;
use super::progress::{Progress, ProgressReporter};
use crate::core::io::traits::StructureProvider;
use crate::core::models::atom::Atom;
use crate::core::models::record::{AtomOrdinal, PairwiseRecord};
use crate::core::models::residue::Residue;
use crate::core::overlap::OverlapCalculator;
use crate::core::radii::{ElementRadiusTable, RadiusError};
use crate::core::utils::identifiers::{NUCLEIC_ACID_LIGAND, is_backbone_atom};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, error, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Code used for gaps in the receptor sequence and for residues without a
/// one-letter code.
pub const UNKNOWN_RESIDUE_CODE: char = 'X';

const RIBOSE_O2_ATOM: &str = "O2'";

/// One receptor chain scanned against the het atoms of one ligand structure.
pub struct DistanceJob<'a> {
    pub chain_id: String,
    pub ligand_id: String,
    pub receptor: &'a dyn StructureProvider,
    pub ligand: &'a dyn StructureProvider,
}

/// Receptor atoms of one residue number, sorted by (x, y, z, element).
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueGroup {
    pub number: isize,
    pub code: char,
    pub atoms: Vec<Atom>,
}

/// A receptor chain reduced to what the pair scan needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedChain {
    /// Groups in order of first appearance.
    pub groups: Vec<ResidueGroup>,
    /// Lowest residue number; maps to position 1.
    pub origin: isize,
    /// One-letter codes from `origin` to the highest residue number, gaps as 'X'.
    pub sequence: String,
}

impl PreparedChain {
    pub fn position_of(&self, number: isize) -> isize {
        number - self.origin + 1
    }
}

fn has_canonical_backbone(residue: &Residue) -> bool {
    let first_four: BTreeSet<&str> = residue.atom_names().take(4).collect();
    first_four.len() == 4 && first_four.iter().all(|name| is_backbone_atom(name))
}

fn sort_atoms(atoms: &mut [Atom]) {
    atoms.sort_by(|a, b| {
        a.position
            .x
            .total_cmp(&b.position.x)
            .then(a.position.y.total_cmp(&b.position.y))
            .then(a.position.z.total_cmp(&b.position.z))
            .then_with(|| a.element.cmp(&b.element))
    });
}

/// Groups receptor atoms by residue number and applies the backbone rule.
///
/// A residue repeating the previous residue's number (an insertion-code
/// sibling) is appended to that group with all of its atoms.
pub fn prepare_chain(
    residues: &[Residue],
    include_backbone: bool,
    chain_id: &str,
    source_name: &str,
) -> Result<PreparedChain, EngineError> {
    let mut groups: Vec<ResidueGroup> = Vec::new();
    let mut group_index: HashMap<isize, usize> = HashMap::new();
    let mut codes: BTreeMap<isize, char> = BTreeMap::new();
    let mut last_number: Option<isize> = None;

    for residue in residues {
        let number = residue.number;
        let code = residue.one_letter_code().unwrap_or(UNKNOWN_RESIDUE_CODE);
        let is_new_number = last_number != Some(number);
        last_number = Some(number);

        let atoms: Vec<&Atom> = if !is_new_number {
            debug!(
                "Residue {} of {} repeats (insertion code {:?}); appending its atoms.",
                number, source_name, residue.insertion_code
            );
            residue.atoms.iter().collect()
        } else if include_backbone {
            residue.atoms.iter().collect()
        } else if has_canonical_backbone(residue) {
            residue
                .atoms
                .iter()
                .filter(|a| !is_backbone_atom(&a.name))
                .collect()
        } else {
            error!(
                "Backbone ERROR in {}-{}-{}",
                source_name, number, residue.name
            );
            residue.atoms.iter().skip(4).collect()
        };

        let idx = *group_index.entry(number).or_insert_with(|| {
            groups.push(ResidueGroup {
                number,
                code,
                atoms: Vec::new(),
            });
            groups.len() - 1
        });
        if is_new_number {
            codes.insert(number, code);
            groups[idx].code = code;
        }
        groups[idx].atoms.extend(atoms.into_iter().cloned());
    }

    let (Some((&origin, _)), Some((&last, _))) = (codes.first_key_value(), codes.last_key_value())
    else {
        return Err(EngineError::EmptyReceptor {
            chain_id: chain_id.to_string(),
            source_name: source_name.to_string(),
        });
    };

    for group in &mut groups {
        sort_atoms(&mut group.atoms);
    }

    let sequence = (origin..=last)
        .map(|n| codes.get(&n).copied().unwrap_or(UNKNOWN_RESIDUE_CODE))
        .collect();

    Ok(PreparedChain {
        groups,
        origin,
        sequence,
    })
}

/// Ligand labels for each atom: the ligand id, plus for nucleic acids an
/// `RNA`/`DNA` subtype and a trailing `B` for sugar-phosphate atoms.
pub fn ligand_labels(ligand_id: &str, atoms: &[Atom]) -> Vec<String> {
    if ligand_id != NUCLEIC_ACID_LIGAND {
        return vec![ligand_id.to_string(); atoms.len()];
    }

    let ribose_residues: HashSet<(&str, isize)> = atoms
        .iter()
        .filter(|a| a.name == RIBOSE_O2_ATOM)
        .map(|a| (a.chain_id.as_str(), a.residue_number))
        .collect();

    atoms
        .iter()
        .map(|atom| {
            let kind = if ribose_residues.contains(&(atom.chain_id.as_str(), atom.residue_number)) {
                "RNA"
            } else {
                "DNA"
            };
            let backbone = if atom.name.contains('\'') || atom.name.contains('P') {
                "B"
            } else {
                ""
            };
            format!("{}{}{}", ligand_id, kind, backbone)
        })
        .collect()
}

/// Tracks which chain last emitted a record so that the full sequence is
/// written once per chain.
#[derive(Debug, Default)]
struct SequenceEmitter {
    previous: Option<String>,
}

impl SequenceEmitter {
    fn sequence_for(&mut self, receptor_id: &str, sequence: &str) -> String {
        if self.previous.as_deref() == Some(receptor_id) {
            String::new()
        } else {
            self.previous = Some(receptor_id.to_string());
            sequence.to_string()
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn scan_pairs(
    receptor_id: &str,
    chain: &PreparedChain,
    ligand_atoms: &[Atom],
    labels: &[String],
    cutoff: f64,
    emitter: &mut SequenceEmitter,
    records: &mut Vec<PairwiseRecord>,
    reporter: &ProgressReporter,
) {
    for (ligand_atom, label) in ligand_atoms.iter().zip(labels) {
        for group in &chain.groups {
            let count = group.atoms.len();
            for (j, atom) in group.atoms.iter().enumerate() {
                let distance = atom.distance_to(&ligand_atom.position);
                if distance <= cutoff {
                    records.push(PairwiseRecord {
                        receptor_id: receptor_id.to_string(),
                        residue_index: chain.position_of(group.number),
                        residue_code: group.code,
                        atom_ordinal: AtomOrdinal {
                            index: j + 1,
                            count,
                        },
                        receptor_element: atom.element.clone(),
                        ligand_id: label.clone(),
                        ligand_element: ligand_atom.element.clone(),
                        distance,
                        overlap_vdw: None,
                        overlap_fixed: None,
                        full_sequence: emitter.sequence_for(receptor_id, &chain.sequence),
                    });
                }
            }
        }
        reporter.report(Progress::TaskIncrement);
    }
}

/// Fills both overlap integrals of every record. Output order is the input order.
pub fn compute_overlaps(
    records: &mut [PairwiseRecord],
    radii: &ElementRadiusTable,
    legacy_overlap_reuse: bool,
    reporter: &ProgressReporter,
) -> Result<(), EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Overlap Integrals",
    });

    let radius_pairs = records
        .iter()
        .map(|r| Ok((radii.radius(&r.receptor_element)?, radii.radius(&r.ligand_element)?)))
        .collect::<Result<Vec<(f64, f64)>, RadiusError>>()?;

    let calculator = OverlapCalculator::default();
    reporter.report(Progress::TaskStart {
        label: "overlaps".to_string(),
        total: records.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = records.iter_mut().zip(radius_pairs.iter());

    #[cfg(feature = "parallel")]
    let iterator = records.par_iter_mut().zip(radius_pairs.par_iter());

    iterator.for_each(|(record, &(receptor_radius, ligand_radius))| {
        record.overlap_vdw = Some(calculator.overlap(record.distance, receptor_radius, ligand_radius));
        record.overlap_fixed = Some(calculator.fixed_overlap(record.distance));
        reporter.report(Progress::TaskIncrement);
    });
    reporter.report(Progress::TaskFinish);

    if legacy_overlap_reuse {
        let changed = memo::reuse_overlaps(records, &radius_pairs)?;
        reporter.report(Progress::Message(format!(
            "Legacy overlap reuse rewrote {} records",
            changed
        )));
    }

    reporter.report(Progress::PhaseFinish);
    Ok(())
}

/// Enumerates every receptor-atom / ligand-atom pair within the cutoff for
/// each job, in job order, and optionally computes their overlaps.
#[instrument(skip_all, name = "distance_engine", fields(pdb_id = %pdb_id, jobs = jobs.len()))]
pub fn compute_pairwise_records(
    pdb_id: &str,
    jobs: &[DistanceJob],
    config: &DistanceConfig,
    radii: &ElementRadiusTable,
    reporter: &ProgressReporter,
) -> Result<Vec<PairwiseRecord>, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Pairwise Distances",
    });

    let mut records = Vec::new();
    let mut emitter = SequenceEmitter::default();

    for job in jobs {
        let receptor_id = format!("{}{}", pdb_id, job.chain_id);
        let residues = job.receptor.residues(&job.chain_id)?;
        let chain = prepare_chain(
            &residues,
            config.include_backbone,
            &job.chain_id,
            job.receptor.source_name(),
        )?;

        let ligand_atoms = job.ligand.ligand_atoms(&job.ligand_id)?;
        if ligand_atoms.is_empty() {
            warn!(
                "No ligand atoms for '{}' in {}.",
                job.ligand_id,
                job.ligand.source_name()
            );
        }
        let labels = ligand_labels(&job.ligand_id, &ligand_atoms);

        debug!(
            "{}: {} residue groups (origin {}), {} ligand atoms for '{}'.",
            receptor_id,
            chain.groups.len(),
            chain.origin,
            ligand_atoms.len(),
            job.ligand_id
        );

        reporter.report(Progress::TaskStart {
            label: format!("{} / {}", receptor_id, job.ligand_id),
            total: ligand_atoms.len() as u64,
        });
        let before = records.len();
        scan_pairs(
            &receptor_id,
            &chain,
            &ligand_atoms,
            &labels,
            config.cutoff,
            &mut emitter,
            &mut records,
            reporter,
        );
        reporter.report(Progress::TaskFinish);
        reporter.report(Progress::Message(format!(
            "{} / {}: {} pairs within {} Å",
            receptor_id,
            job.ligand_id,
            records.len() - before,
            config.cutoff
        )));
    }
    reporter.report(Progress::PhaseFinish);
    info!("Found {} atom pairs within {} Å.", records.len(), config.cutoff);

    if config.calculate_overlap {
        compute_overlaps(&mut records, radii, config.legacy_overlap_reuse, reporter)?;
    }

    Ok(records)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::io::traits::StructureError;
    use crate::engine::config::DistanceConfigBuilder;
    use nalgebra::Point3;
    use std::sync::Mutex;

    /// In-memory structure used by engine and workflow tests.
    pub(crate) struct MockStructure {
        pub name: String,
        pub residues: Vec<Residue>,
        pub ligand: Vec<Atom>,
    }

    impl StructureProvider for MockStructure {
        fn source_name(&self) -> &str {
            &self.name
        }

        fn residues(&self, chain_id: &str) -> Result<Vec<Residue>, StructureError> {
            if self.residues.is_empty() {
                return Err(StructureError::NoChain {
                    chain_id: chain_id.to_string(),
                    source_name: self.name.clone(),
                });
            }
            Ok(self.residues.clone())
        }

        fn ligand_atoms(&self, _ligand_id: &str) -> Result<Vec<Atom>, StructureError> {
            Ok(self.ligand.clone())
        }
    }

    pub(crate) fn residue(number: isize, name: &str, atoms: &[(&str, &str, [f64; 3])]) -> Residue {
        let mut r = Residue::new(number, name);
        for (atom_name, element, [x, y, z]) in atoms {
            r.add_atom(Atom::new(atom_name, element, Point3::new(*x, *y, *z), number, "A"));
        }
        r
    }

    pub(crate) fn alanine(number: isize, x: f64) -> Residue {
        residue(
            number,
            "ALA",
            &[
                ("N", "N", [x, 0.0, 0.0]),
                ("CA", "C", [x, 1.0, 0.0]),
                ("C", "C", [x, 2.0, 0.0]),
                ("O", "O", [x, 3.0, 0.0]),
                ("CB", "C", [x, 1.0, 1.0]),
            ],
        )
    }

    pub(crate) fn ligand_atom(name: &str, element: &str, position: [f64; 3], residue: isize) -> Atom {
        Atom::new(
            name,
            element,
            Point3::new(position[0], position[1], position[2]),
            residue,
            "B",
        )
    }

    fn run(
        receptor: &MockStructure,
        ligand: &MockStructure,
        ligand_id: &str,
        config: &DistanceConfig,
    ) -> Result<Vec<PairwiseRecord>, EngineError> {
        let jobs = [DistanceJob {
            chain_id: "A".to_string(),
            ligand_id: ligand_id.to_string(),
            receptor,
            ligand,
        }];
        compute_pairwise_records(
            "1abc",
            &jobs,
            config,
            &ElementRadiusTable::bundled().unwrap(),
            &ProgressReporter::new(),
        )
    }

    fn mock(residues: Vec<Residue>, ligand: Vec<Atom>) -> MockStructure {
        MockStructure {
            name: "mock".to_string(),
            residues,
            ligand,
        }
    }

    #[test]
    fn backbone_atoms_are_dropped_when_canonical() {
        let chain = prepare_chain(&[alanine(10, 0.0)], false, "A", "mock").unwrap();
        assert_eq!(chain.groups.len(), 1);
        let names: Vec<&str> = chain.groups[0].atoms.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["CB"]);
        assert_eq!(chain.origin, 10);
        assert_eq!(chain.sequence, "A");
    }

    #[test]
    fn non_canonical_backbone_drops_first_four_atoms() {
        let odd = residue(
            3,
            "SER",
            &[
                ("CB", "C", [0.0, 0.0, 0.0]),
                ("N", "N", [1.0, 0.0, 0.0]),
                ("CA", "C", [2.0, 0.0, 0.0]),
                ("C", "C", [3.0, 0.0, 0.0]),
                ("O", "O", [4.0, 0.0, 0.0]),
                ("OG", "O", [5.0, 0.0, 0.0]),
            ],
        );
        let chain = prepare_chain(&[odd], false, "A", "mock").unwrap();
        let names: Vec<&str> = chain.groups[0].atoms.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["O", "OG"]);
    }

    #[test]
    fn include_backbone_keeps_all_atoms_and_records_codes() {
        let chain = prepare_chain(&[alanine(1, 0.0), alanine(2, 5.0)], true, "A", "mock").unwrap();
        assert_eq!(chain.groups[0].atoms.len(), 5);
        assert_eq!(chain.sequence, "AA");
    }

    #[test]
    fn insertion_code_sibling_appends_all_atoms() {
        let sibling = alanine(7, 3.0).with_insertion_code("A");
        let chain = prepare_chain(&[alanine(7, 0.0), sibling], false, "A", "mock").unwrap();
        assert_eq!(chain.groups.len(), 1);
        assert_eq!(chain.groups[0].atoms.len(), 1 + 5);
    }

    #[test]
    fn atoms_are_sorted_by_coordinates_then_element() {
        let r = residue(
            1,
            "SER",
            &[
                ("N", "N", [0.0, 0.0, 0.0]),
                ("CA", "C", [0.0, 0.0, 0.0]),
                ("C", "C", [0.0, 0.0, 0.0]),
                ("O", "O", [0.0, 0.0, 0.0]),
                ("OG", "O", [1.0, 2.0, 3.0]),
                ("CB", "C", [1.0, 2.0, 3.0]),
                ("XX", "C", [0.5, 9.0, 9.0]),
            ],
        );
        let chain = prepare_chain(&[r], false, "A", "mock").unwrap();
        let names: Vec<&str> = chain.groups[0].atoms.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["XX", "CB", "OG"]);
    }

    #[test]
    fn sequence_spans_gaps_with_unknown_code() {
        let chain = prepare_chain(
            &[alanine(5, 0.0), residue(8, "GLY", &[("N", "N", [0.0; 3])])],
            false,
            "A",
            "mock",
        )
        .unwrap();
        assert_eq!(chain.origin, 5);
        assert_eq!(chain.sequence, "AXXG");
        assert_eq!(chain.position_of(8), 4);
    }

    #[test]
    fn empty_receptor_is_an_error() {
        let err = prepare_chain(&[], false, "A", "mock").unwrap_err();
        assert!(matches!(err, EngineError::EmptyReceptor { .. }));
    }

    #[test]
    fn nucleic_acid_atoms_get_subtypes() {
        let atoms = vec![
            ligand_atom("O2'", "O", [0.0; 3], 1),
            ligand_atom("N1", "N", [0.0; 3], 1),
            ligand_atom("P", "P", [0.0; 3], 2),
            ligand_atom("C4'", "C", [0.0; 3], 2),
            ligand_atom("N7", "N", [0.0; 3], 2),
        ];
        assert_eq!(
            ligand_labels("NUC", &atoms),
            ["NUCRNAB", "NUCRNA", "NUCDNAB", "NUCDNAB", "NUCDNA"]
        );
        assert_eq!(ligand_labels("ZN", &atoms[..1]), ["ZN"]);
    }

    #[test]
    fn only_pairs_within_cutoff_are_reported() {
        let receptor = mock(vec![alanine(1, 0.0), alanine(2, 30.0)], vec![]);
        let ligand = mock(vec![], vec![ligand_atom("ZN", "ZN", [0.0, 1.0, 4.0], 1)]);
        let config = DistanceConfigBuilder::new()
            .cutoff(5.0)
            .calculate_overlap(false)
            .build()
            .unwrap();
        let records = run(&receptor, &ligand, "ZN", &config).unwrap();

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.receptor_id, "1abcA");
        assert_eq!(r.residue_index, 1);
        assert_eq!(r.residue_code, 'A');
        assert_eq!(r.atom_ordinal, AtomOrdinal { index: 1, count: 1 });
        assert_eq!(r.distance, 3.0);
        assert_eq!(r.full_sequence, "AA");
        assert!(!r.has_overlap());
        assert!(records.iter().all(|r| r.distance <= 5.0));
    }

    #[test]
    fn distance_equal_to_cutoff_is_kept() {
        let receptor = mock(vec![alanine(1, 0.0)], vec![]);
        let ligand = mock(vec![], vec![ligand_atom("C1", "C", [0.0, 1.0, 3.0], 1)]);
        let config = DistanceConfigBuilder::new()
            .cutoff(2.0)
            .calculate_overlap(false)
            .build()
            .unwrap();
        let records = run(&receptor, &ligand, "III", &config).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].distance, 2.0);
    }

    #[test]
    fn full_sequence_appears_only_on_first_record_of_chain() {
        let receptor = mock(vec![alanine(1, 0.0), alanine(2, 1.0)], vec![]);
        let ligand = mock(
            vec![],
            vec![
                ligand_atom("C1", "C", [0.0, 0.0, 0.0], 1),
                ligand_atom("C2", "C", [1.0, 0.0, 0.0], 1),
            ],
        );
        let config = DistanceConfigBuilder::new()
            .calculate_overlap(false)
            .build()
            .unwrap();
        let records = run(&receptor, &ligand, "III", &config).unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].full_sequence, "AA");
        assert!(records[1..].iter().all(|r| r.full_sequence.is_empty()));
    }

    #[test]
    fn overlaps_are_filled_in_record_order() {
        let receptor = mock(vec![alanine(1, 0.0), alanine(2, 2.0)], vec![]);
        let ligand = mock(vec![], vec![ligand_atom("ZN", "ZN", [0.0, 1.0, 1.0], 1)]);
        let records = run(&receptor, &ligand, "ZN", &DistanceConfig::default()).unwrap();

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.has_overlap()));
        assert!(records[0].distance < records[1].distance);
        let near = records[0].overlap_fixed.unwrap().value;
        let far = records[1].overlap_fixed.unwrap().value;
        assert!(near > far);
        assert!((near - 1.0).abs() < 1e-3);
    }

    /// Lysine side chain CB (C) and NZ (N) against a ligand N over CB and a
    /// ligand C over NZ. Records 0 and 3 are both C-N pairs at 3 Å, with the
    /// radii swapped between receptor and ligand.
    fn swapped_radius_pairs(legacy_overlap_reuse: bool) -> (Vec<PairwiseRecord>, Vec<String>) {
        let receptor = mock(
            vec![residue(
                1,
                "LYS",
                &[
                    ("N", "N", [0.0, 0.0, -30.0]),
                    ("CA", "C", [0.0, 1.0, -30.0]),
                    ("C", "C", [0.0, 2.0, -30.0]),
                    ("O", "O", [0.0, 3.0, -30.0]),
                    ("CB", "C", [0.0, 0.0, 0.0]),
                    ("NZ", "N", [10.0, 0.0, 0.0]),
                ],
            )],
            vec![],
        );
        let ligand = mock(
            vec![],
            vec![
                ligand_atom("N1", "N", [0.0, 0.0, 3.0], 1),
                ligand_atom("C1", "C", [10.0, 0.0, 3.0], 1),
            ],
        );
        let config = DistanceConfigBuilder::new()
            .legacy_overlap_reuse(legacy_overlap_reuse)
            .build()
            .unwrap();

        let messages = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::Message(msg) = event {
                messages.lock().unwrap().push(msg);
            }
        }));
        let jobs = [DistanceJob {
            chain_id: "A".to_string(),
            ligand_id: "III".to_string(),
            receptor: &receptor,
            ligand: &ligand,
        }];
        let records = compute_pairwise_records(
            "1abc",
            &jobs,
            &config,
            &ElementRadiusTable::bundled().unwrap(),
            &reporter,
        )
        .unwrap();
        drop(reporter);
        (records, messages.into_inner().unwrap())
    }

    #[test]
    fn overlaps_are_kept_per_record_by_default() {
        let (records, messages) = swapped_radius_pairs(false);
        let calc = OverlapCalculator::default();

        assert_eq!(records.len(), 4);
        assert_eq!((records[0].distance, records[3].distance), (3.0, 3.0));
        assert_eq!(records[0].receptor_element, "C");
        assert_eq!(records[3].receptor_element, "N");
        assert_eq!(records[0].overlap_vdw, Some(calc.overlap(3.0, 1.7, 1.55)));
        assert_eq!(records[3].overlap_vdw, Some(calc.overlap(3.0, 1.55, 1.7)));
        assert!(messages.iter().all(|m| !m.contains("overlap reuse")));
    }

    #[test]
    fn legacy_reuse_gives_shared_keys_the_last_computed_value() {
        let (records, messages) = swapped_radius_pairs(true);
        let calc = OverlapCalculator::default();
        let last_written = Some(calc.overlap(3.0, 1.55, 1.7));

        assert_eq!(records[0].overlap_vdw, last_written);
        assert_eq!(records[3].overlap_vdw, last_written);
        // No pair has both radii at 1.5, so the fixed-radius values stand.
        assert!(
            records
                .iter()
                .all(|r| r.overlap_fixed == Some(calc.fixed_overlap(r.distance)))
        );
        assert!(messages.iter().any(|m| m.starts_with("Legacy overlap reuse rewrote")));
    }

    #[test]
    fn unknown_element_fails_overlap_computation() {
        let receptor = mock(vec![alanine(1, 0.0)], vec![]);
        let ligand = mock(vec![], vec![ligand_atom("Q1", "QQ", [0.0, 1.0, 1.0], 1)]);
        let err = run(&receptor, &ligand, "III", &DistanceConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::Radius { .. }));
    }

    #[test]
    fn progress_counts_one_step_per_ligand_atom() {
        let receptor = mock(vec![alanine(1, 0.0)], vec![]);
        let ligand = mock(
            vec![],
            vec![
                ligand_atom("C1", "C", [0.0, 0.0, 0.0], 1),
                ligand_atom("C2", "C", [50.0, 0.0, 0.0], 1),
            ],
        );
        let increments = Mutex::new(0u64);
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if event == Progress::TaskIncrement {
                *increments.lock().unwrap() += 1;
            }
        }));
        let jobs = [DistanceJob {
            chain_id: "A".to_string(),
            ligand_id: "III".to_string(),
            receptor: &receptor,
            ligand: &ligand,
        }];
        let config = DistanceConfigBuilder::new()
            .calculate_overlap(false)
            .build()
            .unwrap();
        compute_pairwise_records(
            "1abc",
            &jobs,
            &config,
            &ElementRadiusTable::bundled().unwrap(),
            &reporter,
        )
        .unwrap();
        drop(reporter);
        assert_eq!(increments.into_inner().unwrap(), 2);
    }
}
