use std::io::{BufWriter, Result, Write};

use crate::types::Proof;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Binary,
    Plain,
}

pub fn write_proof(writer: &mut impl Write, format: Format, proof: &Proof) -> Result<()> {
    let mut writer = BufWriter::new(writer);

    for (step, clause) in proof {
        match format {
            Format::Binary => binary::write_lemma(&mut writer, *step, clause)?,
            Format::Plain => plain::write_lemma(&mut writer, *step, clause)?,
        };
    }

    writer.flush()
}

mod binary {
    use std::io::{Result, Write};

    use crate::types::{Literal, ProofStep};

    const BUF_SIZE: usize = (u32::BITS / 7 + 1) as usize;

    fn var_byte_encode(mut num: u32, buf: &mut [u8; BUF_SIZE]) -> &[u8] {
        let mut len = 0;
        loop {
            buf[len] = (num & 127) as u8 | 128;
            len += 1;
            num >>= 7;

            if num == 0 {
                break;
            }
        }
        buf[len - 1] &= 127;
        &buf[..len]
    }

    fn encode_lit(lit: Literal, buf: &mut [u8; BUF_SIZE]) -> &[u8] {
        let ulit = (2 * lit.var + lit.negated as usize) as u32;
        var_byte_encode(ulit, buf)
    }

    pub fn write_lemma(writer: &mut impl Write, step: ProofStep, clause: &[Literal]) -> Result<()> {
        let step_code = match step {
            ProofStep::Add => b'a',
            ProofStep::Delete => b'd',
        };
        writer.write_all(&[step_code])?;

        let mut buf = [0; BUF_SIZE];
        for &lit in clause {
            let enc = encode_lit(lit, &mut buf);
            writer.write_all(enc)?;
        }

        writer.write_all(&[0])
    }

}

mod plain {
    use std::io::{Result, Write};

    use crate::types::{Literal, ProofStep};

    pub fn write_lemma(writer: &mut impl Write, step: ProofStep, clause: &[Literal]) -> Result<()> {
        let step_str = match step {
            ProofStep::Add => "",
            ProofStep::Delete => "d ",
        };
        let clause_str = clause
            .iter()
            .fold(String::new(), |str, lit| str + &lit.to_string() + " ");
        writeln!(writer, "{step_str}{clause_str}0")
    }

    #[cfg(test)]
    mod tests {
        use crate::types::{Literal, ProofStep};

        use super::write_lemma;

        #[test]
        fn lemma_encoding() {
            let mut buf: Vec<u8> = vec![];
            let clause: Vec<Literal> = [-63, -8193].into_iter().map(Literal::from_dimacs).collect();
            write_lemma(&mut buf, ProofStep::Delete, &clause).unwrap();
            write_lemma(&mut buf, ProofStep::Add, &[]).unwrap();
            let str = std::str::from_utf8(&buf).unwrap();
            assert_eq!(str, "d -63 -8193 0\n0\n");
        }
    }
}
