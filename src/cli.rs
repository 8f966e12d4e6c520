//! Command-line interface for the ahead-of-time route compiler.

use crate::artifact::{Artifact, CompiledMatcher};
use crate::linter::lint_routes;
use crate::manifest::load_manifest;
use crate::router::{get_param, MatchResult, Router};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "switchback")]
#[command(about = "Switchback route table compiler", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a route manifest into a matcher artifact
    Compile {
        #[arg(short, long)]
        routes: PathBuf,

        #[arg(short, long)]
        out: PathBuf,
    },
    /// Check a route manifest for conflicts and shadowed routes
    Check {
        #[arg(short, long)]
        routes: PathBuf,

        /// Also print the frozen table
        #[arg(long, default_value_t = false)]
        dump: bool,
    },
    /// Resolve a method and path against a manifest or a compiled artifact
    Resolve {
        #[arg(short, long)]
        routes: Option<PathBuf>,

        #[arg(short, long)]
        artifact: Option<PathBuf>,

        method: String,
        path: String,
    },
}

pub fn run_cli() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Compile { routes, out } => {
            let router = build_router(routes)?;
            let issues = lint_routes(&router);
            for issue in &issues {
                eprintln!("[{}] {}: {}", issue.severity, issue.location, issue.message);
            }
            Artifact::compile(&router).write(out)?;
            println!(
                "compiled {} routes to {} ({} issues)",
                router.len(),
                out.display(),
                issues.len()
            );
            Ok(())
        }
        Commands::Check { routes, dump } => {
            let router = build_router(routes)?;
            if *dump {
                router.dump_routes();
            }
            let issues = lint_routes(&router);
            for issue in &issues {
                println!("[{}] {}: {}", issue.severity, issue.location, issue.message);
                if let Some(suggestion) = &issue.suggestion {
                    println!("    suggestion: {suggestion}");
                }
            }
            if issues.is_empty() {
                println!("{} routes, no issues", router.len());
            }
            Ok(())
        }
        Commands::Resolve {
            routes,
            artifact,
            method,
            path,
        } => {
            let (result, describe): (MatchResult, Box<dyn Fn(usize) -> String>) =
                match (routes, artifact) {
                    (Some(routes), None) => {
                        let router = build_router(routes)?;
                        let result = router.match_route(method, path);
                        let patterns: Vec<String> = router
                            .routes()
                            .iter()
                            .map(|r| format!("{} -> {}", r.pattern(), r.handler()))
                            .collect();
                        (result, Box::new(move |i| patterns[i].clone()))
                    }
                    (None, Some(artifact)) => {
                        let matcher = CompiledMatcher::load(artifact)?;
                        let result = matcher.match_route(method, path);
                        let patterns: Vec<String> = matcher
                            .records()
                            .iter()
                            .map(|r| format!("{} -> {}", r.pattern, r.handler))
                            .collect();
                        (result, Box::new(move |i| patterns[i].clone()))
                    }
                    _ => return Err("pass exactly one of --routes or --artifact".into()),
                };

            match result {
                MatchResult::Hit {
                    route_index,
                    params,
                } => {
                    println!("matched route #{route_index}: {}", describe(route_index));
                    let mut names: Vec<&str> =
                        params.iter().map(|(k, _)| k.as_ref()).collect();
                    names.dedup();
                    for name in names {
                        if let Some(value) = get_param(&params, name) {
                            println!("  {name} = {value}");
                        }
                    }
                }
                MatchResult::MethodNotAllowed { allowed } => {
                    println!("method not allowed; allowed: {}", allowed.join(", "));
                }
                MatchResult::NotFound => println!("no route matched"),
            }
            Ok(())
        }
    }
}

fn build_router(routes: &Path) -> Result<Router, Box<dyn std::error::Error>> {
    let manifest = load_manifest(routes)?;
    Ok(Router::new(manifest.build_routes()?))
}
