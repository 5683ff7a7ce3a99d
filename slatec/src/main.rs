use std::io::{self, BufRead};
use std::{env, fs, process, thread};

use slate_interp::{Event, Host, Interpreter};
use slate_lexer::tokenize;

fn canonicalize(cmd: &str) -> &str {
    match cmd.to_ascii_lowercase().as_str() {
        "run" => "run",
        "lex" => "lex",
        "help" | "-h" | "--help" => "help",
        _ => cmd,
    }
}

fn print_help() {
    println!("Slate CLI\n");
    println!("Commands:");
    println!("  run   Execute a .slate program");
    println!("  lex   Dump tokens line by line (debug)");
    println!("  help  Show this message\n");
    println!("Usage:");
    println!("  slatec <command> <file.slate>\n");
    println!("Examples:");
    println!("  slatec run demos/grades.slate");
    println!("  slatec lex demos/grades.slate");
}

fn read_source(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(src) => src,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", path, e);
            process::exit(2);
        }
    }
}

fn cmd_run(path: Option<String>) {
    let Some(path) = path else {
        eprintln!("usage: slatec run <file.slate>");
        process::exit(2)
    };
    let src = read_source(&path);

    let (host, events, input, _cancel) = Host::channel();
    let worker = thread::spawn(move || {
        let mut interp = Interpreter::new(host);
        let _ = interp.interpret(&src);
    });

    // Closing the input sender on stdin EOF makes a pending INPUT stop
    // instead of blocking forever.
    let mut input = Some(input);
    let stdin = io::stdin();
    let mut code = 0;
    for ev in events.iter() {
        match ev {
            Event::Output(line) => println!("{}", line),
            Event::Warning(w) => eprintln!("warning: {}", w),
            Event::InputRequest => {
                let mut line = String::new();
                match stdin.lock().read_line(&mut line) {
                    Ok(n) if n > 0 => {
                        if let Some(tx) = &input {
                            let _ = tx.send(line);
                        }
                    }
                    _ => input = None,
                }
            }
            Event::Done(_) => {}
            Event::Error(msg) => {
                eprintln!("{}", msg);
                code = 1;
            }
        }
    }
    let _ = worker.join();
    process::exit(code);
}

fn cmd_lex(path: Option<String>) {
    let Some(path) = path else {
        eprintln!("usage: slatec lex <file.slate>");
        process::exit(2)
    };
    let src = read_source(&path);
    for (i, line) in src.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let num = (i + 1) as u32;
        match tokenize(line, num) {
            Ok(tokens) => {
                print!("{:>4}:", num);
                for t in &tokens {
                    print!(" {:?}", t.kind);
                }
                println!();
            }
            Err(e) => println!("{:>4}: {}", num, e),
        }
    }
}

fn main() {
    let mut args = env::args().skip(1);
    let Some(cmd) = args.next() else {
        print_help();
        process::exit(2)
    };
    match canonicalize(&cmd) {
        "run" => cmd_run(args.next()),
        "lex" => cmd_lex(args.next()),
        "help" => print_help(),
        other => {
            eprintln!("error: unknown command '{}'", other);
            print_help();
            process::exit(2);
        }
    }
}
