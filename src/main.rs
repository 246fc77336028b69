// Print app package metadata as JSON
// Usage: app-extractor [--with-icon] [--verbose] [--algorithm md5|sha1|sha256] <path>...
//
// Control log level with RUST_LOG env var:
//   RUST_LOG=debug app-extractor App.ipa
//   RUST_LOG=app_extractor::icon=trace app-extractor Calculator.appxbundle

use std::process::ExitCode;

use app_extractor::{logging, ExtractOptions, Extractor, HashAlgorithm};

const USAGE: &str = "usage: app-extractor [--with-icon] [--verbose] [--algorithm md5|sha1|sha256] <path>...";

#[derive(Debug)]
struct Args {
    with_icon: bool,
    verbose: bool,
    algorithm: HashAlgorithm,
    paths: Vec<String>,
}

fn parse_args(argv: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut args = Args {
        with_icon: false,
        verbose: false,
        algorithm: HashAlgorithm::default(),
        paths: Vec::new(),
    };
    let mut argv = argv.into_iter();
    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--with-icon" => args.with_icon = true,
            "--verbose" | "-v" => args.verbose = true,
            "--help" | "-h" => return Err(USAGE.to_string()),
            "--algorithm" | "-a" => {
                let name = argv.next().ok_or_else(|| format!("--algorithm needs a value\n{USAGE}"))?;
                args.algorithm = HashAlgorithm::from_str(&name)?;
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option: {flag}\n{USAGE}")),
            path => args.paths.push(path.to_string()),
        }
    }
    if args.paths.is_empty() {
        return Err(USAGE.to_string());
    }
    Ok(args)
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    if args.verbose {
        logging::init_verbose();
    } else {
        logging::init();
    }

    let extractor = Extractor::new(ExtractOptions::default().with_fingerprint_algorithm(args.algorithm));
    let mut failed = false;

    for path in &args.paths {
        let descriptor = match extractor.run(path) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                eprintln!("error: {path}: {e}");
                failed = true;
                continue;
            }
        };

        let mut json = match serde_json::to_value(&descriptor) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("error: {path}: {e}");
                failed = true;
                continue;
            }
        };
        if !args.with_icon {
            if let Some(object) = json.as_object_mut() {
                object.remove("icon");
            }
        }

        match serde_json::to_string_pretty(&json) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("error: {path}: {e}");
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
