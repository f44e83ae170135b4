use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;

use physalia_core::Result;
use physalia_io::{ingest_links, scan_max_node_id, IngestOptions};
use physalia_tree::{
    write_ascii_tree, AsciiTreeOptions, MaxSpanningTree, DEFAULT_TWILIGHT_THRESHOLD,
};

#[derive(Parser)]
#[command(name = "physalia")]
#[command(about = "Build a maximum spanning tree from similarity links", long_about = None)]
#[command(version)]
struct Cli {
    /// Input CSV file with links (query,target,score,location,length)
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    input: PathBuf,

    /// Output JSON snapshot file
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: PathBuf,

    /// Number of nodes; auto-detected from the input when omitted
    #[arg(short = 'n', long = "nodes", value_name = "INT")]
    nodes: Option<usize>,

    /// Score threshold for the twilight node list
    #[arg(long = "twilight", value_name = "INT", default_value_t = DEFAULT_TWILIGHT_THRESHOLD)]
    twilight: i32,

    /// Also write an ASCII rendering of the tree to this file
    #[arg(long = "tree", value_name = "FILE")]
    tree: Option<PathBuf>,

    /// Stop descending ASCII-tree branches below this score (0 = show all)
    #[arg(short = 't', long = "threshold", value_name = "INT", default_value_t = 0)]
    threshold: i32,
}

fn run(cli: &Cli) -> Result<()> {
    let num_nodes = match cli.nodes {
        Some(n) => n,
        None => {
            log::info!("scanning {} for the maximum node id", cli.input.display());
            let max_id = scan_max_node_id(&cli.input)?;
            log::info!("detected {} nodes", max_id + 1);
            max_id + 1
        }
    };

    let mut tree = MaxSpanningTree::new(num_nodes);

    log::info!("processing {}", cli.input.display());
    ingest_links(&cli.input, &mut tree, &IngestOptions::default())?;

    log::info!("links processed: {}", tree.links_processed());
    log::info!("links added: {}", tree.links_added());
    log::info!("links rejected: {}", tree.links_rejected());

    log::info!("writing snapshot to {}", cli.output.display());
    let writer = BufWriter::new(File::create(&cli.output)?);
    tree.snapshot(cli.twilight).to_json_writer(writer)?;

    if let Some(tree_path) = &cli.tree {
        log::info!("writing ASCII tree to {}", tree_path.display());
        let mut writer = BufWriter::new(File::create(tree_path)?);
        let options = AsciiTreeOptions {
            score_threshold: cli.threshold,
            show_isolated: true,
        };
        write_ascii_tree(&tree, &mut writer, &options)?;
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
