use clap::{Args as ClapArgs, Parser, Subcommand};
use docform_core::{EditSession, Path, SaveOpts, ScanOpts};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "docform",
    about = "Read and edit JSON documents (e.g. package.json) by JSON Pointer",
    version
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the value at a JSON pointer
    Get(PtrArgs),
    /// List children at a JSON pointer
    List(PtrArgs),
    /// Apply one or more edits; prints the result or writes with --out/--in-place
    Set(SetArgs),
    /// Show structural differences between two documents
    Diff(DiffArgs),
    /// Find JSON documents under a directory
    Scan(ScanArgs),
}

#[derive(ClapArgs, Debug)]
struct PtrArgs {
    /// Document to load
    path: PathBuf,
    /// JSON Pointer, e.g. /dependencies/serde (empty for the whole document)
    #[arg(long, default_value = "")]
    ptr: String,
}

#[derive(ClapArgs, Debug)]
struct SetArgs {
    /// Document to load
    path: PathBuf,
    /// Edit as POINTER=VALUE; VALUE is coerced to the type already at POINTER.
    /// The pointer ends at the first '=', so keys containing '=' cannot be set
    #[arg(long = "set", value_name = "POINTER=VALUE", required = true)]
    edits: Vec<String>,
    /// Treat each VALUE as raw JSON instead of form text
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Output path; otherwise prints to stdout
    #[arg(long, conflicts_with = "in_place")]
    out: Option<PathBuf>,
    /// Overwrite the input document
    #[arg(long, default_value_t = false)]
    in_place: bool,
    /// Zip the existing output file before overwriting it
    #[arg(long, default_value_t = false)]
    backup: bool,
    /// Print the changed paths instead of the document
    #[arg(long, default_value_t = false)]
    diff: bool,
    /// Write compact JSON
    #[arg(long, default_value_t = false)]
    compact: bool,
}

#[derive(ClapArgs, Debug)]
struct DiffArgs {
    before: PathBuf,
    after: PathBuf,
}

#[derive(ClapArgs, Debug)]
struct ScanArgs {
    /// Directory to walk
    dir: PathBuf,
    /// Only match this file name, e.g. package.json
    #[arg(long)]
    name: Option<String>,
    /// Max directory depth
    #[arg(long, default_value_t = 8)]
    max_depth: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docform_cli=info,docform_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Get(a) => cmd_get(a),
        Cmd::List(a) => cmd_list(a),
        Cmd::Set(a) => cmd_set(a),
        Cmd::Diff(a) => cmd_diff(a),
        Cmd::Scan(a) => cmd_scan(a),
    }
}

fn fail(code: i32, msg: impl std::fmt::Display) -> ! {
    eprintln!("error: {}", msg);
    std::process::exit(code);
}

fn load(path: &std::path::Path) -> EditSession {
    docform_core::load_file(path).unwrap_or_else(|e| fail(2, e))
}

fn parse_ptr(ptr: &str) -> Path {
    Path::parse_pointer(ptr).unwrap_or_else(|e| fail(3, e))
}

fn print_json(v: &serde_json::Value) {
    match serde_json::to_string_pretty(v) {
        Ok(s) => println!("{}", s),
        Err(e) => fail(5, e),
    }
}

fn cmd_get(args: PtrArgs) {
    let session = load(&args.path);
    match session.get(&parse_ptr(&args.ptr)) {
        Ok(v) => print_json(v),
        Err(e) => fail(3, e),
    }
}

fn cmd_list(args: PtrArgs) {
    let session = load(&args.path);
    let children = docform_core::children(session.working(), &parse_ptr(&args.ptr))
        .unwrap_or_else(|e| fail(3, e));
    for c in children {
        println!(
            "{}\t{:?}\t{}",
            c.key.unwrap_or_default(),
            c.kind,
            c.text
        );
    }
}

fn cmd_set(args: SetArgs) {
    let target = output_target(&args).unwrap_or_else(|e| fail(3, e));
    let mut session = load(&args.path);
    for edit in &args.edits {
        let Some((ptr, raw)) = split_edit(edit) else {
            fail(3, format!("expected POINTER=VALUE, got {:?}", edit));
        };
        let path = parse_ptr(ptr);
        let next = if args.json {
            let value: serde_json::Value = serde_json::from_str(raw)
                .unwrap_or_else(|e| fail(3, format!("invalid JSON for {}: {}", ptr, e)));
            session.commit_value(&path, value)
        } else {
            session.commit(&path, raw)
        };
        session = next.unwrap_or_else(|e| fail(4, e));
    }
    tracing::debug!(edits = session.changes().len(), "applied edits");

    if args.diff {
        print_diff(&session.diff());
    }
    let opts = SaveOpts {
        pretty: !args.compact,
        backup: args.backup,
        ..SaveOpts::default()
    };
    match target {
        Some(out) => {
            if let Some(zip) =
                docform_core::save_file(&out, session.working(), &opts).unwrap_or_else(|e| fail(5, e))
            {
                eprintln!("backup: {}", zip.display());
            }
        }
        None if !args.diff => {
            let text = docform_core::io::to_text(session.working(), &opts)
                .unwrap_or_else(|e| fail(5, e));
            print!("{}", text);
        }
        None => {}
    }
}

fn split_edit(edit: &str) -> Option<(&str, &str)> {
    edit.split_once('=')
}

// Where `set` writes its result; `None` means stdout.
fn output_target(args: &SetArgs) -> Result<Option<PathBuf>, String> {
    let target = if args.in_place {
        Some(args.path.clone())
    } else {
        args.out.clone()
    };
    if args.backup && target.is_none() {
        return Err("--backup needs --out or --in-place".into());
    }
    Ok(target)
}

fn cmd_diff(args: DiffArgs) {
    let before = load(&args.before);
    let after = load(&args.after);
    let changes = docform_core::diff_values(before.working(), after.working());
    if changes.is_empty() {
        println!("no differences");
        return;
    }
    print_diff(&changes);
}

fn print_diff(changes: &std::collections::BTreeMap<Path, docform_core::ValueChange>) {
    let show = |v: &Option<serde_json::Value>| match v {
        Some(v) => v.to_string(),
        None => "(absent)".to_string(),
    };
    for (path, change) in changes {
        println!("{}\t{} -> {}", path, show(&change.before), show(&change.after));
    }
}

fn cmd_scan(args: ScanArgs) {
    let opts = ScanOpts {
        file_name: args.name,
        max_depth: args.max_depth,
    };
    let found = docform_core::find_documents(&args.dir, &opts).unwrap_or_else(|e| fail(2, e));
    for p in found {
        println!("{}", p.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_args(argv: &[&str]) -> SetArgs {
        let mut full = vec!["docform", "set", "package.json"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().cmd {
            Cmd::Set(a) => a,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn backup_without_output_is_rejected() {
        let args = set_args(&["--set", "/name=x", "--backup"]);
        assert!(output_target(&args).is_err());

        let args = set_args(&["--set", "/name=x", "--backup", "--in-place"]);
        assert_eq!(output_target(&args).unwrap(), Some(PathBuf::from("package.json")));

        let args = set_args(&["--set", "/name=x", "--backup", "--out", "out.json"]);
        assert_eq!(output_target(&args).unwrap(), Some(PathBuf::from("out.json")));

        let args = set_args(&["--set", "/name=x"]);
        assert_eq!(output_target(&args).unwrap(), None);
    }

    #[test]
    fn edit_splits_at_first_equals_sign() {
        assert_eq!(split_edit("/scripts/env=A=1"), Some(("/scripts/env", "A=1")));
        assert_eq!(split_edit("/a=b=c").map(|(p, _)| p), Some("/a"));
        assert_eq!(split_edit("/name"), None);
        assert_eq!(split_edit("/name="), Some(("/name", "")));
    }

    #[test]
    fn out_and_in_place_conflict() {
        let r = Cli::try_parse_from([
            "docform", "set", "p.json", "--set", "/a=1", "--out", "o.json", "--in-place",
        ]);
        assert!(r.is_err());
    }
}
