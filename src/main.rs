use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::{env, ops::Not};

use clap::Parser;
use log::error;

use crate::check::CheckReport;
use crate::cli::{Cli, Command};
use crate::search::SearchConfig;

mod check;
mod cli;
mod error;
mod graph;
mod input;
mod search;

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Solve { path, window, walk } => _solve(path, window, walk),
        Command::Check {
            dir,
            recursive,
            window,
        } => _check(dir, recursive, window),
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn _solve(path: Option<PathBuf>, window: usize, walk: bool) -> Result<bool, String> {
    let text = match &path {
        Some(p) => fs::read_to_string(p).map_err(|e| format!("Cannot read {}: {e}", p.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("Cannot read stdin: {e}"))?;
            buf
        }
    };
    let out = input::answers(&text, SearchConfig::with_window(window), walk).map_err(|e| e.to_string())?;
    io::stdout()
        .lock()
        .write_all(out.as_bytes())
        .map_err(|e| format!("Cannot write answers: {e}"))?;
    Ok(true)
}

fn _check(dir: Option<PathBuf>, recursive: bool, window: usize) -> Result<bool, String> {
    let path = match dir {
        Some(dir) => dir,
        None => env::current_dir().map_err(|e| format!("Cannot access current directory: {e}"))?,
    };
    let report = check::check_dir(&path, recursive, SearchConfig::with_window(window));
    print_report(&report);
    Ok(report.is_success())
}

fn print_report(report: &CheckReport) {
    report
        .passed
        .iter()
        .for_each(|p| println!("OK\t{}", p.display()));
    if report.failed.is_empty().not() {
        println!();
        println!("Wrong answers:");
        report.failed.iter().for_each(|m| {
            println!("{}\tline {}", m.input.display(), m.line);
            println!("\texpected\t{}", m.expected);
            println!("\tfound\t\t{}", m.actual);
        })
    }
    if report.missing.is_empty().not() {
        println!();
        println!("Warning, NO answer file found for these inputs:");
        report
            .missing
            .iter()
            .for_each(|p| println!("{}", p.display()));
    }
    if report.errors.is_empty().not() {
        println!();
        println!("Errors:");
        report.errors.iter().for_each(|e| println!("{e}"));
    }
    println!();
    println!(
        "Checked {} inputs: {} passed, {} failed",
        report.passed.len() + report.failed.len() + report.missing.len() + report.errors.len(),
        report.passed.len(),
        report.failed.len() + report.errors.len()
    );
}
