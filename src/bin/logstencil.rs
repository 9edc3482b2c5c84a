use std::fs::File;
use std::io::{self, BufReader, Write};

use clap::Parser;

use logstencil::miner::StructureMiner;
use logstencil::progress::{NullProgress, Progress, StderrProgress};
use logstencil::render;

#[derive(Parser, Debug)]
#[command(name = "logstencil", version, about = "mine a structural template tree from log lines")]
struct Cli {
    /// Input files (`-` for stdin). May be repeated; defaults to stdin.
    #[arg(required = false)]
    input: Vec<String>,

    /// Report progress indicators on stderr
    #[arg(long = "report-progress", short = 'p', default_value_t = false)]
    report_progress: bool,

    /// Output format: text | json
    #[arg(long = "format", default_value = "text")]
    format: String,

    /// Also dump the tree before refinement
    #[arg(long = "raw", default_value_t = false)]
    raw: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let progress: Box<dyn Progress> = if cli.report_progress {
        Box::new(StderrProgress::new())
    } else {
        Box::new(NullProgress)
    };
    let mut miner = StructureMiner::with_progress(progress);

    let inputs = if cli.input.is_empty() {
        vec!["-".to_string()]
    } else {
        cli.input.clone()
    };
    for path in &inputs {
        if path == "-" {
            let stdin = io::stdin();
            miner.ingest_reader(stdin.lock())?;
        } else {
            let file = File::open(path)?;
            miner.ingest_reader(BufReader::new(file))?;
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.raw {
        render::render_text(miner.tree(), &mut out)?;
    }

    miner.refine();

    match cli.format.as_str() {
        "json" => {
            serde_json::to_writer_pretty(&mut out, &render::to_json_tree(miner.tree()))?;
            writeln!(out)?;
        }
        _ => render::render_text(miner.tree(), &mut out)?,
    }
    Ok(())
}
