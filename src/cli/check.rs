use crate::cli::generate::{plan, GenerateArgs};
use crate::errors::Result;

/// Dry run for CI: report every file `generate` would create or update and
/// exit non-zero when the tree is out of date.
pub fn run(args: &GenerateArgs) -> Result<()> {
    let planned = plan(args)?;

    let mut out_of_date = 0usize;
    for file in &planned {
        if !file.changed {
            continue;
        }
        out_of_date += 1;
        if file.exists {
            println!("would update {}", file.path.display());
        } else {
            println!("would create {}", file.path.display());
        }
    }

    if out_of_date > 0 {
        eprintln!("{out_of_date} file(s) out of date");
        std::process::exit(1);
    }
    eprintln!("up to date");
    Ok(())
}
