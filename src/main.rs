use std::env;
use std::io::{self, Write};

use color_eyre::eyre::{eyre, Result, WrapErr};
use log::LevelFilter;
use simple_logger::SimpleLogger;

use nibble_cpu::memory;
use nibble_cpu::port::{led_pattern, INT_CHAR, INT_LEDS};
use nibble_cpu::{Byte, LogPort, OutputPort, Snapshot, StdProcessor};

const USAGE: &str = "usage: nibble-cpu <program.asm> [-v|-q] [--step N] [--dump]";

#[derive(Debug)]
struct Options {
    program: String,
    level: LevelFilter,
    max_steps: Option<usize>,
    dump: bool,
}

fn parse_args() -> Result<Options> {
    let mut program = None;
    let mut level = LevelFilter::Info;
    let mut max_steps = None;
    let mut dump = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-v" => level = LevelFilter::Debug,
            "-vv" => level = LevelFilter::Trace,
            "-q" => level = LevelFilter::Warn,
            "--dump" => dump = true,
            "--step" => {
                let count = args.next().ok_or_else(|| eyre!("--step needs a count"))?;
                max_steps = Some(
                    count
                        .parse::<usize>()
                        .wrap_err_with(|| format!("invalid step count `{}`", count))?,
                );
            }
            "-h" | "--help" => return Err(eyre!(USAGE)),
            _ if program.is_none() => program = Some(arg.clone()),
            _ => return Err(eyre!("unexpected argument `{}`\n{}", arg, USAGE)),
        }
    }

    Ok(Options {
        program: program.ok_or_else(|| eyre!(USAGE))?,
        level,
        max_steps,
        dump,
    })
}

/// Prints INT 1 characters to stdout and LED patterns to stderr
struct ConsolePort {
    log: LogPort,
}

impl OutputPort for ConsolePort {
    fn on_state_changed(&mut self, state: &Snapshot<'_>) {
        self.log.on_state_changed(state);
    }

    fn on_interrupt(&mut self, number: Byte, ax: Byte) {
        match number {
            INT_CHAR => {
                let mut stdout = io::stdout();
                let _ = write!(stdout, "{}", char::from(ax));
                let _ = stdout.flush();
            }
            INT_LEDS => eprintln!("[{}] {:02x}", led_pattern(ax), ax),
            _ => self.log.on_interrupt(number, ax),
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    let options = parse_args()?;
    SimpleLogger::new()
        .with_level(options.level)
        .init()
        .map_err(|err| eyre!("{}", err))?; // logging

    let source = memory::read_source(&options.program)?;

    let mut cpu = StdProcessor::with_port(ConsolePort { log: LogPort });
    let labels = cpu
        .load_program(&source)
        .wrap_err_with(|| format!("Failed to assemble `{}`", options.program))?;

    for (name, address) in labels.sorted() {
        log::debug!("{:>12}: 0x{:02x}", name, address);
    }
    if options.dump {
        cpu.memory.dump(cpu.pc);
    }

    match options.max_steps {
        Some(max) => {
            let mut steps = 1;
            cpu.run_with(|cpu| {
                steps += 1;
                if steps > max {
                    cpu.stop();
                }
            })?;
        }
        None => cpu.run()?,
    }

    log::info!("Registers:\n{}\n{}", cpu.registers, cpu.flags);
    if options.dump {
        cpu.memory.dump(cpu.pc);
    }

    Ok(())
}
