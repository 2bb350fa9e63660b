/// Config Parser Tracer - Shows the flow through Source → Tokens → AST → Canonical form
///
/// Usage: cargo run --bin trace_parser [--json] <config-file>
///
/// Set CONFIT_INCLUDES=1 to expand `include` parameters and RUST_LOG to
/// control log output (default `confit=info`).

use confit::{pretty_print, Diagnostics, IncludeRegistry, Parser, Pos, Scanner, TokenKind};
use std::fs;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("confit=info"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn includes_enabled() -> bool {
    std::env::var("CONFIT_INCLUDES")
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true"))
        .unwrap_or(false)
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let json = args.iter().any(|a| a == "--json");
    let path = match args.iter().find(|a| !a.starts_with("--")) {
        Some(path) => path.clone(),
        None => {
            eprintln!("Usage: cargo run --bin trace_parser [--json] <config-file>");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  CONFIT_INCLUDES=1 cargo run --bin trace_parser confit/tests/fixtures/server.conf");
            std::process::exit(1);
        }
    };

    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path, e);
            std::process::exit(1);
        }
    };

    println!("╔═══════════════════════════════════════════════════════════════");
    println!("║ CONFIG PARSER TRACER");
    println!("╚═══════════════════════════════════════════════════════════════\n");

    println!("📝 INPUT:");
    println!("{}", content);
    println!();

    // Step 1: Tokens (diagnostics are reported once, by the parse below)
    println!("🔍 TOKENS:");
    println!("─────────────────────────────────────────────────────────────");
    {
        let mut quiet = Diagnostics::new(|_: &Pos, _: &str| {});
        let mut scanner = Scanner::new(path.clone(), &content, &mut quiet);
        for token in scanner.tokenize() {
            match token.kind {
                TokenKind::Name | TokenKind::Literal(_) => {
                    let kind = token.lit_kind().map_or("name", |k| k.as_str());
                    println!("{:<12} {:<8} {:?}", token.pos.to_string(), kind, token.text);
                }
                kind => println!("{:<12} {}", token.pos.to_string(), kind),
            }
        }
    }
    println!();

    // Step 2: AST
    let mut diag = Diagnostics::stderr();
    let mut registry = IncludeRegistry::new();
    let mut parser = Parser::new(path.clone(), &content, &mut diag);
    if includes_enabled() {
        parser = parser.with_includes(&mut registry);
    }
    let (params, errors) = parser.parse_file();

    println!("🌳 AST:");
    println!("─────────────────────────────────────────────────────────────");
    if json {
        match serde_json::to_string_pretty(&params) {
            Ok(out) => println!("{}", out),
            Err(e) => eprintln!("Failed to serialize AST: {}", e),
        }
    } else {
        println!("{:#?}", params);
    }
    println!();

    // Step 3: Round-trip
    println!("🔄 CANONICAL FORM:");
    println!("─────────────────────────────────────────────────────────────");
    println!("{}", pretty_print(&params));

    if errors > 0 {
        println!("❌ Parser encountered {} error(s)", errors);
        std::process::exit(1);
    }
    println!("✅ Parse succeeded!");
}
