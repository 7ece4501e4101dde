use std::env;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use roget_db::{LoadMode, Thesaurus};
use roget_format::{KindMask, TextFormatter, XmlFormatter};

const USAGE: &str =
    "usage: cargo run -p roget-format --example dump -- <path-to-roget.txt> [--xml] [--mask=<0-15>]";

fn main() -> Result<()> {
    let mut source = None;
    let mut xml = false;
    let mut mask = KindMask::ALL;
    for arg in env::args().skip(1) {
        if arg == "--xml" {
            xml = true;
        } else if let Some(raw) = arg.strip_prefix("--mask=") {
            let bits: u8 = raw.parse().with_context(|| format!("bad mask {raw:?}"))?;
            mask = KindMask::from_bits(bits);
        } else if source.is_none() {
            source = Some(PathBuf::from(arg));
        } else {
            bail!(USAGE);
        }
    }
    let source = source.context(USAGE)?;

    let thesaurus = Thesaurus::load_with_mode(&source, LoadMode::Mmap)
        .with_context(|| format!("loading thesaurus from {}", source.display()))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if xml {
        XmlFormatter::new().write(&thesaurus, &mut out)?;
    } else {
        TextFormatter::with_mask(mask).write(&thesaurus, &mut out)?;
    }
    out.flush()?;
    Ok(())
}
