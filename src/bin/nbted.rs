use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use log::{debug, error, info, warn};

use nbted::error::EditError;
use nbted::region::{CompressionType, RegionFile};
use nbted::tag::Tag;
use nbted::{codec, mutate};

/// Command-line editor for Minecraft NBT and region (`.mca`) files.
#[derive(Parser, Debug)]
#[command(name = "nbted", version, about)]
struct Cli {
    /// Input file: a standalone NBT document or a region (.mca) file.
    file: PathBuf,

    /// Select local chunk (0..31 each) inside a region file.
    #[arg(long, num_args = 2, value_names = ["X", "Z"], allow_negative_numbers = true)]
    chunk: Option<Vec<i32>>,

    /// Apply an edit: PATH must already resolve to a tag.
    #[arg(long, num_args = 2, value_names = ["PATH", "VALUE"])]
    edit: Option<Vec<String>>,

    /// Edit-or-create: creates PATH's final key if it is absent.
    #[arg(long, num_args = 2, value_names = ["PATH", "VALUE"])]
    set: Option<Vec<String>>,

    /// Delete every tag/element PATH resolves to.
    #[arg(long, value_name = "PATH")]
    delete: Option<String>,

    /// Write a text dump of the (possibly edited) tree to OUT.
    #[arg(long, value_name = "OUT")]
    dump: Option<PathBuf>,

    /// Write the mutated result to PATH instead of the default name.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Overwrite the input file atomically instead of writing a new one.
    #[arg(long)]
    in_place: bool,

    /// With --in-place, copy the input to input+SUFFIX first (default .bak).
    #[arg(long, num_args = 0..=1, default_missing_value = ".bak", value_name = "SUFFIX")]
    backup: Option<String>,

    /// Raise log verbosity: -v for debug, -vv for trace.
    #[arg(short = 'v', action = ArgAction::Count)]
    verbose: u8,
}

enum Operation {
    Edit(String, String),
    Set(String, String),
    Delete(String),
}

impl Operation {
    fn label(&self) -> &'static str {
        match self {
            Operation::Edit(..) => "edit",
            Operation::Set(..) => "set",
            Operation::Delete(..) => "delete",
        }
    }

    fn path(&self) -> &str {
        match self {
            Operation::Edit(p, _) | Operation::Set(p, _) | Operation::Delete(p) => p,
        }
    }

    fn apply(&self, root: &mut Tag) -> Result<(), EditError> {
        match self {
            Operation::Edit(path, value) => mutate::edit(root, path, value),
            Operation::Set(path, value) => mutate::set_or_create(root, path, value),
            Operation::Delete(path) => mutate::delete(root, path),
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn is_region_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("mca"))
        .unwrap_or(false)
}

fn pick_operation(cli: &Cli) -> Result<Option<Operation>, String> {
    let mut ops = Vec::new();
    if let Some(pair) = &cli.edit {
        ops.push(Operation::Edit(pair[0].clone(), pair[1].clone()));
    }
    if let Some(pair) = &cli.set {
        ops.push(Operation::Set(pair[0].clone(), pair[1].clone()));
    }
    if let Some(path) = &cli.delete {
        ops.push(Operation::Delete(path.clone()));
    }
    if ops.len() > 1 {
        return Err("only one of --edit, --set, --delete may be given".to_string());
    }
    Ok(ops.pop())
}

fn default_output_path(region: bool) -> PathBuf {
    if region {
        PathBuf::from("modified_output.mca")
    } else {
        PathBuf::from("modified_output.dat")
    }
}

fn write_backup(input: &Path, suffix: &str) -> Result<(), String> {
    let mut backup_name = input.as_os_str().to_os_string();
    backup_name.push(suffix);
    fs::copy(input, &backup_name)
        .map(|_| ())
        .map_err(|e| format!("failed to write backup: {}", e))
}

fn resolve_destination(cli: &Cli, region: bool) -> Result<PathBuf, String> {
    if cli.in_place {
        if let Some(suffix) = &cli.backup {
            write_backup(&cli.file, suffix)?;
        }
        Ok(cli.file.clone())
    } else if let Some(output) = &cli.output {
        Ok(output.clone())
    } else {
        Ok(default_output_path(region))
    }
}

fn dump_tag(tag: &Tag, out: &Path) -> Result<(), String> {
    let text = format!("{:#?}\n", tag);
    fs::write(out, text).map_err(|e| format!("failed to write dump: {}", e))
}

fn run(cli: &Cli) -> Result<(), String> {
    let operation = pick_operation(cli)?;
    let bytes = fs::read(&cli.file).map_err(|e| format!("failed to read '{}': {}", cli.file.display(), e))?;
    let region = is_region_file(&cli.file);

    if region {
        info!("loading region file {}", cli.file.display());
        let mut region_file = RegionFile::read(&bytes).map_err(|e| e.to_string())?;

        let (x, z) = match &cli.chunk {
            Some(coords) => (coords[0], coords[1]),
            None => region_file
                .find_first_populated_chunk()
                .ok_or_else(|| "region file has no populated chunk".to_string())?,
        };
        debug!("operating on chunk ({}, {})", x, z);

        let mut root = region_file.extract_chunk_tag(x, z).map_err(|e| e.to_string())?;

        if let Some(op) = &operation {
            apply_operation(op, &mut root)?;
        }

        if let Some(out) = &cli.dump {
            dump_tag(&root, out)?;
        }

        if operation.is_some() {
            let compression = region_file
                .get_chunk(x, z)
                .ok()
                .and_then(|slot| slot.compression)
                .unwrap_or(CompressionType::Zlib);
            region_file
                .update_chunk_from_tag(x, z, &root, Some(compression))
                .map_err(|e| e.to_string())?;

            let destination = resolve_destination(cli, true)?;
            region_file
                .write_atomic(&destination)
                .map_err(|e| format!("failed to write '{}': {}", destination.display(), e))?;
            info!("wrote {}", destination.display());
        }
    } else {
        info!("loading standalone document {}", cli.file.display());
        let framing = codec::detect_framing(&bytes);
        let decoded = codec::inflate(&bytes, framing).map_err(|e| e.to_string())?;
        let (mut root, _) = nbted::builder::parse_document(&decoded).map_err(|e| e.to_string())?;

        if let Some(op) = &operation {
            apply_operation(op, &mut root)?;
        }

        if let Some(out) = &cli.dump {
            dump_tag(&root, out)?;
        }

        if operation.is_some() {
            let raw = nbted::serialize::serialize_to_bytes(&root).map_err(|e| e.to_string())?;
            let compressed = codec::deflate(&raw, codec::Framing::Gzip).map_err(|e| e.to_string())?;

            let destination = resolve_destination(cli, false)?;
            if cli.in_place {
                let tmp = destination.with_extension("tmp");
                fs::write(&tmp, &compressed).map_err(|e| format!("failed to write '{}': {}", tmp.display(), e))?;
                fs::rename(&tmp, &destination)
                    .map_err(|e| format!("failed to write '{}': {}", destination.display(), e))?;
            } else {
                fs::write(&destination, &compressed)
                    .map_err(|e| format!("failed to write '{}': {}", destination.display(), e))?;
            }
            info!("wrote {}", destination.display());
        }
    }

    if operation.is_none() && cli.dump.is_none() {
        warn!("no operation specified; nothing to do beyond loading the input");
    }

    Ok(())
}

fn apply_operation(op: &Operation, root: &mut Tag) -> Result<(), String> {
    op.apply(root).map_err(|err| {
        error!("{} on '{}' failed: {}", op.label(), op.path(), err);
        format!(
            "Failed to {} path '{}': {} ({})",
            op.label(),
            op.path(),
            err.detail(),
            err.status_name()
        )
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}
