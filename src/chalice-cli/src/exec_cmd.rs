//! `chalice exec`: run guest code through the execution engine.

use std::io::Read;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chalice_common::ChaliceConfig;
use chalice_exec::GuestLanguage;
use chalice_servers::{execution_engine, safety_policy};

use crate::cli::ExecArgs;
use crate::output::print_payload;

pub async fn run(args: ExecArgs, config: &ChaliceConfig) -> Result<ExitCode> {
    let source = read_source(&args)?;
    let language = GuestLanguage::from(args.language);

    let engine = execution_engine(config, Arc::new(safety_policy(config)));
    let mut request = engine.request(language, source);
    if let Some(secs) = args.timeout {
        request = request.with_timeout_secs(secs);
    }
    if let Some(stdin) = args.stdin {
        request = request.with_stdin(stdin);
    }
    if let Some(dir) = args.cwd {
        request = request.with_working_dir(dir);
    }

    let result = engine.execute(request).await;
    print_payload(&result.to_payload())
}

fn read_source(args: &ExecArgs) -> Result<String> {
    if let Some(path) = &args.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    match args.source.as_deref() {
        Some("-") => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("failed to read source from stdin")?;
            Ok(source)
        }
        Some(source) => Ok(source.to_string()),
        None => bail!("no source given; pass SOURCE, `-` or --file"),
    }
}
