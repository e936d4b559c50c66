use std::io::{self, BufRead, Write};

/// A named protein sequence, as submitted to domain search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub name: String,
    pub sequence: String,
}

impl SequenceRecord {
    pub fn new(name: &str, sequence: &str) -> Self {
        Self {
            name: name.to_string(),
            sequence: sequence.to_string(),
        }
    }
}

/// One `pos-ligand-score` entry of a binding-site header.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingSiteEntry {
    pub position: isize,
    pub ligand_id: String,
    pub score: f64,
}

/// A receptor chain and its scored binding-site residues.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedChain {
    pub chain_id: String,
    pub sequence: String,
    pub entries: Vec<BindingSiteEntry>,
}

/// `>{chain} bindingSiteRes={pos}-{lig}-{score:.5},...;` followed by the sequence.
pub fn format_annotation(chain: &AnnotatedChain) -> String {
    let sites: Vec<String> = chain
        .entries
        .iter()
        .map(|entry| format!("{}-{}-{:.5}", entry.position, entry.ligand_id, entry.score))
        .collect();
    format!(
        ">{} bindingSiteRes={};\n{}\n\n",
        chain.chain_id,
        sites.join(","),
        chain.sequence
    )
}

pub fn write_annotations<W: Write>(writer: &mut W, chains: &[AnnotatedChain]) -> io::Result<()> {
    for chain in chains {
        writer.write_all(format_annotation(chain).as_bytes())?;
    }
    Ok(())
}

pub fn write_sequences<W: Write>(writer: &mut W, records: &[SequenceRecord]) -> io::Result<()> {
    for record in records {
        write!(writer, ">{}\n{}\n\n", record.name, record.sequence)?;
    }
    Ok(())
}

/// Reads plain FASTA; the record name is the first word of the header line.
pub fn read_sequences<R: BufRead>(reader: R) -> io::Result<Vec<SequenceRecord>> {
    let mut records: Vec<SequenceRecord> = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if let Some(header) = line.strip_prefix('>') {
            let name = header.split_whitespace().next().unwrap_or("");
            records.push(SequenceRecord::new(name, ""));
        } else if !line.is_empty() {
            match records.last_mut() {
                Some(record) => record.sequence.push_str(line),
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "sequence data before the first FASTA header",
                    ));
                }
            }
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_header_lists_scores_with_five_decimals() {
        let chain = AnnotatedChain {
            chain_id: "2lueA".to_string(),
            sequence: "MKVLX".to_string(),
            entries: vec![
                BindingSiteEntry {
                    position: 3,
                    ligand_id: "III".to_string(),
                    score: 0.5,
                },
                BindingSiteEntry {
                    position: 4,
                    ligand_id: "DNAB".to_string(),
                    score: 1.0 / 3.0,
                },
            ],
        };
        assert_eq!(
            format_annotation(&chain),
            ">2lueA bindingSiteRes=3-III-0.50000,4-DNAB-0.33333;\nMKVLX\n\n"
        );
    }

    #[test]
    fn empty_annotation_still_writes_the_record() {
        let chain = AnnotatedChain {
            chain_id: "1abcB".to_string(),
            sequence: "GG".to_string(),
            entries: Vec::new(),
        };
        assert_eq!(format_annotation(&chain), ">1abcB bindingSiteRes=;\nGG\n\n");
    }

    #[test]
    fn annotations_are_written_back_to_back() {
        let chain = |id: &str, score: f64| AnnotatedChain {
            chain_id: id.to_string(),
            sequence: "AC".to_string(),
            entries: vec![BindingSiteEntry {
                position: 2,
                ligand_id: "ZN".to_string(),
                score,
            }],
        };
        let mut out = Vec::new();
        write_annotations(&mut out, &[chain("1abcA", 0.125), chain("1abcB", 2.0)]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            ">1abcA bindingSiteRes=2-ZN-0.12500;\nAC\n\n>1abcB bindingSiteRes=2-ZN-2.00000;\nAC\n\n"
        );
    }

    #[test]
    fn sequences_round_trip_through_fasta() {
        let records = vec![
            SequenceRecord::new("ctcf", "FQCELCSYTCPRRSNLDRHMKSH"),
            SequenceRecord::new("znf", "HKCPDCDMAF"),
        ];
        let mut buffer = Vec::new();
        write_sequences(&mut buffer, &records).unwrap();
        assert!(String::from_utf8_lossy(&buffer).starts_with(">ctcf\nFQCEL"));
        assert_eq!(read_sequences(buffer.as_slice()).unwrap(), records);
    }

    #[test]
    fn wrapped_sequence_lines_are_joined() {
        let input = ">q1 description here\nACDE\nFGHI\n>q2\nKLM\n";
        let records = read_sequences(input.as_bytes()).unwrap();
        assert_eq!(records[0], SequenceRecord::new("q1", "ACDEFGHI"));
        assert_eq!(records[1], SequenceRecord::new("q2", "KLM"));
    }

    #[test]
    fn sequence_without_header_is_rejected() {
        assert!(read_sequences("ACDE\n".as_bytes()).is_err());
    }
}
