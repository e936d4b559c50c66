//! Aligned query strings from the main (hmmer3 text) output of hmmscan.

use super::DomainError;
use crate::core::io::compress;
use std::collections::HashMap;
use std::fmt;
use std::io::BufRead;
use std::path::Path;

const FORMAT: &str = "hmmer3 text";

/// Identifies one domain alignment. Coordinates are 1-based inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlignmentKey {
    pub query: String,
    pub hit: String,
    pub hmm_from: usize,
    pub hmm_to: usize,
    pub ali_from: usize,
    pub ali_to: usize,
}

impl fmt::Display for AlignmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} (hmm {}-{}, ali {}-{})",
            self.query, self.hit, self.hmm_from, self.hmm_to, self.ali_from, self.ali_to
        )
    }
}

pub type AlignmentMap = HashMap<AlignmentKey, String>;

#[derive(Debug, Clone, Copy)]
struct DomainCoords {
    hmm_from: usize,
    hmm_to: usize,
    ali_from: usize,
    ali_to: usize,
}

/// Row of the per-hit domain table:
/// `# flag score bias c-Evalue i-Evalue hmmfrom hmmto .. alifrom alito .. envfrom envto .. acc`.
fn parse_domain_row(tokens: &[&str]) -> Option<(usize, DomainCoords)> {
    if tokens.len() < 16 || !matches!(tokens[1], "!" | "?") {
        return None;
    }
    let number = |i: usize| tokens[i].parse::<usize>().ok();
    Some((
        number(0)?,
        DomainCoords {
            hmm_from: number(6)?,
            hmm_to: number(7)?,
            ali_from: number(9)?,
            ali_to: number(10)?,
        },
    ))
}

fn is_coordinate(token: &str) -> bool {
    token == "-" || token.parse::<usize>().is_ok()
}

/// `name start ALIGNED end`, as printed for both the model and the query.
fn sequence_line_residues<'a>(tokens: &[&'a str]) -> Option<&'a str> {
    (tokens.len() == 4 && is_coordinate(tokens[1]) && is_coordinate(tokens[3])).then(|| tokens[2])
}

struct Parser {
    alignments: AlignmentMap,
    query: Option<String>,
    hit: Option<String>,
    domains: HashMap<usize, DomainCoords>,
    current: Option<(usize, Vec<String>)>,
}

impl Parser {
    fn new() -> Self {
        Self {
            alignments: AlignmentMap::new(),
            query: None,
            hit: None,
            domains: HashMap::new(),
            current: None,
        }
    }

    /// Closes the open `== domain` block; sequence lines alternate between
    /// model and query, so every second one carries the query residues.
    fn finish_domain(&mut self, line_no: usize) -> Result<(), DomainError> {
        let Some((index, lines)) = self.current.take() else {
            return Ok(());
        };
        let (Some(query), Some(hit)) = (&self.query, &self.hit) else {
            return Err(DomainError::Parse {
                format: FORMAT,
                line: line_no,
                message: "domain alignment outside of a query/hit section".to_string(),
            });
        };
        let coords = self.domains.get(&index).ok_or_else(|| DomainError::Parse {
            format: FORMAT,
            line: line_no,
            message: format!("alignment for domain {} of '{}' has no table row", index, hit),
        })?;
        let aligned: String = lines.iter().skip(1).step_by(2).map(String::as_str).collect();

        let key = AlignmentKey {
            query: query.clone(),
            hit: hit.clone(),
            hmm_from: coords.hmm_from,
            hmm_to: coords.hmm_to,
            ali_from: coords.ali_from,
            ali_to: coords.ali_to,
        };
        if self.alignments.contains_key(&key) {
            return Err(DomainError::DuplicateAlignment(key.to_string()));
        }
        self.alignments.insert(key, aligned);
        Ok(())
    }

    fn feed(&mut self, line_no: usize, line: &str) -> Result<(), DomainError> {
        let trimmed = line.trim();
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();

        if let Some(rest) = trimmed.strip_prefix("Query:") {
            self.finish_domain(line_no)?;
            self.query = rest.split_whitespace().next().map(str::to_string);
            self.hit = None;
        } else if let Some(rest) = trimmed.strip_prefix(">>") {
            self.finish_domain(line_no)?;
            self.hit = rest.split_whitespace().next().map(str::to_string);
            self.domains.clear();
        } else if trimmed.starts_with("== domain") {
            self.finish_domain(line_no)?;
            let index = tokens
                .get(2)
                .and_then(|t| t.parse().ok())
                .ok_or_else(|| DomainError::Parse {
                    format: FORMAT,
                    line: line_no,
                    message: format!("unreadable domain header '{}'", trimmed),
                })?;
            self.current = Some((index, Vec::new()));
        } else if trimmed == "//" || trimmed.starts_with("Internal pipeline statistics") {
            self.finish_domain(line_no)?;
            self.hit = None;
            if trimmed == "//" {
                self.query = None;
            }
        } else if let Some((_, lines)) = self.current.as_mut() {
            if let Some(residues) = sequence_line_residues(&tokens) {
                lines.push(residues.to_string());
            }
        } else if self.hit.is_some() {
            if let Some((index, coords)) = parse_domain_row(&tokens) {
                self.domains.insert(index, coords);
            }
        }
        Ok(())
    }
}

pub fn parse_alignments<R: BufRead>(reader: R, source: &Path) -> Result<AlignmentMap, DomainError> {
    let mut parser = Parser::new();
    let mut last_line = 0;
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| DomainError::io(source, e))?;
        last_line = i + 1;
        parser.feed(last_line, &line)?;
    }
    parser.finish_domain(last_line)?;
    Ok(parser.alignments)
}

pub fn read_alignments(path: &Path) -> Result<AlignmentMap, DomainError> {
    let reader = compress::open_file(path).map_err(|e| DomainError::io(path, e))?;
    parse_alignments(reader, path)
}
