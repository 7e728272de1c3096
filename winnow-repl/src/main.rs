use rustyline::{error::ReadlineError, DefaultEditor};
use std::{fs::File, io::{self, BufReader, IsTerminal, Read}};
use winnow_compute::engine::Engine;
use winnow_compute::eval::value::Value;

/// Runs the input through the engine, printing buffered `print` output, then the result or a
/// rich error report.
fn run(input: &str, engine: &mut Engine) {
    let result = engine.compile(input);
    for line in engine.drain_output() {
        println!("{}", line);
    }
    match result {
        Ok(Value::Nil) => (), // intentionally print nothing
        Ok(res) => println!("{}", res),
        Err(err) => {
            err.build_report("input")
                .eprint(("input", ariadne::Source::from(input)))
                .unwrap();
        }
    }
}

/// Executes a whole source file or piped script in a fresh engine.
fn execute(input: String) {
    let mut engine = Engine::new();
    run(&input, &mut engine);
}

fn main() {
    let mut args = std::env::args();
    args.next();

    if let Some(filename) = args.next() {
        // run source file
        let mut file = BufReader::new(File::open(filename).unwrap());
        let mut input = String::new();
        file.read_to_string(&mut input).unwrap();

        execute(input);
    } else if !io::stdin().is_terminal() {
        // read source from stdin
        let mut input = String::new();
        io::stdin().read_to_string(&mut input).unwrap();

        execute(input);
    } else {
        // run the repl / interactive mode
        let mut rl = DefaultEditor::new().unwrap();
        let mut engine = Engine::new();

        fn process_line(rl: &mut DefaultEditor, engine: &mut Engine) -> Result<(), ReadlineError> {
            let input = rl.readline("> ")?;
            if input.trim().is_empty() {
                return Ok(());
            }

            rl.add_history_entry(&input)?;

            if input.trim() == "clear" {
                engine.clear();
                return Ok(());
            }

            run(&input, engine);
            Ok(())
        }

        loop {
            if let Err(err) = process_line(&mut rl, &mut engine) {
                match err {
                    ReadlineError::Eof | ReadlineError::Interrupted => (),
                    _ => eprintln!("{}", err),
                }
                break;
            }
        }
    }
}
