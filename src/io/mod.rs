pub mod drat;

use std::io::{self as stdio, BufRead, BufReader, BufWriter, Read, Write};

use crate::{
    error::ParseError,
    types::{Clause, Formula, Literal, Solution},
};

/// Reads a DIMACS CNF problem.
///
/// The variable set of the result is the set of variables occurring in
/// clauses, which may be smaller than the declared count.
pub fn read_formula(reader: &mut impl Read) -> Result<Formula, ParseError> {
    let mut lines = BufReader::new(reader).lines().enumerate();

    let (var_count, clause_count) = loop {
        let Some((_, line)) = lines.next() else {
            return Err(ParseError::MissingHeader);
        };
        let line = line?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('c') {
            // comment line
            continue;
        }

        // problem line
        let parts: Vec<&str> = line.split_whitespace().collect();
        let bad_header = || ParseError::BadHeader(line.to_string());
        if parts.len() != 4 || parts[0] != "p" || parts[1] != "cnf" {
            return Err(bad_header());
        }
        break (
            parts[2].parse::<usize>().map_err(|_| bad_header())?,
            parts[3].parse::<usize>().map_err(|_| bad_header())?,
        );
    };

    let mut clauses: Vec<Clause> = vec![];
    let mut clause = vec![];

    for (i, line) in lines {
        let line = line?;
        // SATLIB benchmarks end with a `%` line
        if line.starts_with('%') {
            break;
        }
        if line.starts_with('c') {
            continue;
        }

        for word in line.split_whitespace() {
            let lit = word.parse::<i32>().map_err(|_| ParseError::BadLiteral {
                line: i + 1,
                token: word.to_string(),
            })?;
            match lit {
                0 => {
                    clauses.push(std::mem::take(&mut clause));
                }
                _ => {
                    if lit.unsigned_abs() as usize > var_count {
                        return Err(ParseError::VarOutOfRange { lit, var_count });
                    }
                    clause.push(Literal::from_dimacs(lit));
                }
            }
        }
    }

    // tolerate a missing 0 after the last clause
    if !clause.is_empty() {
        clauses.push(clause);
    }

    if clause_count != clauses.len() {
        return Err(ParseError::ClauseCount {
            expected: clause_count,
            found: clauses.len(),
        });
    }

    Ok(Formula::new(clauses))
}

pub fn write_solution(writer: &mut impl Write, solution: &Solution) -> stdio::Result<()> {
    let mut writer = BufWriter::new(writer);
    writeln!(writer, "c Solved by watchsat.")?;

    let solution_str = match solution {
        Solution::Sat { .. } => "SATISFIABLE",
        Solution::Unsat => "UNSATISFIABLE",
        Solution::Unknown => "UNKNOWN",
    };
    writeln!(writer, "s {solution_str}")?;

    if let Solution::Sat { model } = solution {
        const PER_LINE: usize = 10;
        for chunk in model.chunks(PER_LINE) {
            let chunk_str = chunk
                .iter()
                .fold(String::new(), |str, lit| str + &lit.to_string() + " ");
            writeln!(writer, "v {chunk_str}")?;
        }
        writeln!(writer, "v 0")?;
    }

    writer.flush()
}
