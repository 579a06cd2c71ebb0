//! Quill CLI
//!
//! Evaluates and checks formulas against the standard construct library.

use quill::{init_tracing, ErrorCode, ExpressionFactory, Signature, Type, Value};

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let factory = match ExpressionFactory::standard() {
        Ok(factory) => factory,
        Err(errors) => {
            eprintln!("error: standard library failed to build:\n{errors}");
            std::process::exit(2);
        }
    };

    match args[1].as_str() {
        "eval" => {
            if args.len() < 3 {
                eprintln!("Usage: quill eval <expr> [name=value...]");
                std::process::exit(1);
            }
            eval_command(&factory, &args[2], &args[3..]);
        }
        "check" => {
            if args.len() < 3 {
                eprintln!("Usage: quill check <expr> [name:type...]");
                std::process::exit(1);
            }
            check_command(&factory, &args[2], &args[3..]);
        }
        "symbols" => symbols_command(&factory),
        "--explain" | "explain" => {
            if args.len() < 3 {
                eprintln!("Usage: quill explain <ERROR_CODE>");
                eprintln!("Example: quill explain E2003");
                std::process::exit(1);
            }
            explain_command(&args[2]);
        }
        "help" | "--help" | "-h" => print_usage(),
        "version" | "--version" | "-V" => {
            println!("quill {}", env!("CARGO_PKG_VERSION"));
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Quill expression language");
    println!();
    println!("Usage: quill <command> [args]");
    println!();
    println!("Commands:");
    println!("  eval <expr> [name=value...]   Evaluate an expression");
    println!("  check <expr> [name:type...]   Report diagnostics without evaluating");
    println!("  symbols                       List registered symbols");
    println!("  explain <code>                Describe an error code (e.g. E2003)");
    println!("  help                          Show this message");
    println!();
    println!("Argument values are read as int, float, bool, or otherwise text.");
    println!("Types are int, float, bool or str.");
    println!();
    println!("Set QUILL_LOG (e.g. QUILL_LOG=quill_parse=trace) to enable logging;");
    println!("add QUILL_LOG_TREE=1 for an indented span tree.");
}

fn eval_command(factory: &ExpressionFactory, source: &str, bindings: &[String]) {
    let mut signature = Signature::inferred();
    let mut values = Vec::with_capacity(bindings.len());
    for binding in bindings {
        let Some((name, raw)) = binding.split_once('=') else {
            eprintln!("error: expected name=value, found `{binding}`");
            std::process::exit(1);
        };
        let value = parse_value(raw);
        signature = signature.param(name, value.ty());
        values.push(value);
    }

    let expression = match factory.create(source, &signature) {
        Ok(expression) => expression,
        Err(errors) => {
            eprint!("{}", errors.render(source));
            std::process::exit(1);
        }
    };

    // Discarded parameters are not part of the compiled argument list.
    let named: Vec<(&str, Value)> = signature
        .parameters()
        .iter()
        .zip(values)
        .filter(|(p, _)| expression.unbound_index(p.name.as_str()).is_some())
        .map(|(p, v)| (p.name.as_str(), v))
        .collect();

    match expression.compile().invoke_named(&named) {
        Ok(value) => println!("{value}"),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

fn check_command(factory: &ExpressionFactory, source: &str, declarations: &[String]) {
    let mut signature = Signature::inferred();
    for declaration in declarations {
        let parsed = declaration
            .split_once(':')
            .and_then(|(name, ty)| parse_type(ty).map(|ty| (name, ty)));
        let Some((name, ty)) = parsed else {
            eprintln!("error: expected name:type, found `{declaration}`");
            std::process::exit(1);
        };
        signature = signature.param(name, ty);
    }

    match factory.create(source, &signature) {
        Ok(expression) => {
            println!("ok: {}", expression.output_type());
            println!("{}", expression.tree());
            for parameter in expression.discarded() {
                println!("note: parameter `{}` is never used", parameter.name);
            }
        }
        Err(errors) => {
            eprint!("{}", errors.render(source));
            eprintln!("{} error(s) found", errors.len());
            std::process::exit(1);
        }
    }
}

fn symbols_command(factory: &ExpressionFactory) {
    for symbol in factory.symbols() {
        println!("{symbol}");
        for info in factory.describe(symbol) {
            println!("    {info}");
        }
    }
}

fn explain_command(code: &str) {
    match ErrorCode::parse(code) {
        Some(code) => println!("{code}: {} ({:?})", code.title(), code.phase()),
        None => {
            eprintln!("Unknown error code: {code}");
            std::process::exit(1);
        }
    }
}

fn parse_value(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Int(n);
    }
    if let Ok(x) = raw.parse::<f64>() {
        return Value::Float(x);
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            let text = raw
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
                .unwrap_or(raw);
            Value::from(text)
        }
    }
}

fn parse_type(name: &str) -> Option<Type> {
    match name {
        "int" => Some(Type::Int),
        "float" => Some(Type::Float),
        "bool" => Some(Type::Bool),
        "str" => Some(Type::Str),
        _ => None,
    }
}
