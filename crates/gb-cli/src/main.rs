use std::path::{Path, PathBuf};

use gb_core::engine::Engine;
use gb_core::error::EngineError;

#[derive(Debug)]
enum Command {
    Run(RunArgs),
    Suite(SuiteArgs),
    SelfTest(SelfTestArgs),
}

#[derive(Debug)]
struct RunArgs {
    rom_path: PathBuf,
    boot_rom_path: PathBuf,
    max_frames: Option<u64>,
    trace: bool,
}

#[derive(Debug)]
struct SuiteArgs {
    rom_dir: PathBuf,
    boot_rom_path: PathBuf,
    rom_paths: Vec<PathBuf>,
    max_frames: Option<u64>,
    pass_text: Vec<String>,
    fail_text: Vec<String>,
}

#[derive(Debug)]
struct SelfTestArgs {
    boot_rom_path: PathBuf,
    max_frames: Option<u64>,
    pass_text: Vec<String>,
    fail_text: Vec<String>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum RomResult {
    Pass,
    Fail,
    Timeout,
}

impl RomResult {
    fn as_str(self) -> &'static str {
        match self {
            RomResult::Pass => "PASS",
            RomResult::Fail => "FAIL",
            RomResult::Timeout => "TIMEOUT",
        }
    }
}

fn print_usage() {
    eprintln!(
        "Usage:\n\
  gb-cli run <rom.gb> --boot-rom <boot.bin> [--frames N] [--trace]\n\
  gb-cli suite --boot-rom <boot.bin> [--rom-dir DIR] [--frames N] \
[--pass-text S] [--fail-text S] [ROM...]\n\
  gb-cli self-test --boot-rom <boot.bin> [--frames N] [--pass-text S] [--fail-text S]\n\
\n\
Commands:\n\
  run        Run a single ROM, frame by frame, headless.\n\
  suite      Discover and run a set of ROMs (default dir: ./roms).\n\
  self-test  Run a tiny built-in ROM that prints 'Passed' over serial.\n\
\n\
--boot-rom is required: a missing or wrong-sized boot ROM is a fatal\n\
configuration error, not a silently-substituted default.\n\
\n\
Suite/self-test pass/fail detection:\n\
  - Captures bytes written to SB (0xFF01) whenever SC (0xFF02) is written\n\
    with bit 7 set (the blargg/mooneye test-ROM convention).\n\
  - Marks PASS if the captured output contains any --pass-text (default: 'passed').\n\
  - Marks FAIL if it contains any --fail-text (default: 'failed', 'fail').\n\
  - Otherwise stops at --frames and marks TIMEOUT.\n"
    );
}

fn parse_args() -> Result<Command, String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        return Err("missing args".to_string());
    }

    match args[0].as_str() {
        "-h" | "--help" => {
            print_usage();
            std::process::exit(0);
        }
        "run" => parse_run_args(&args[1..]).map(Command::Run),
        "suite" => parse_suite_args(&args[1..]).map(Command::Suite),
        "self-test" => parse_self_test_args(&args[1..]).map(Command::SelfTest),
        _ => parse_run_args(&args).map(Command::Run),
    }
}

fn parse_run_args(args: &[String]) -> Result<RunArgs, String> {
    if args.is_empty() {
        return Err("missing ROM path".to_string());
    }

    let mut it = args.iter();
    let rom_path = PathBuf::from(it.next().unwrap());

    let mut boot_rom_path: Option<PathBuf> = None;
    let mut max_frames: Option<u64> = None;
    let mut trace = false;

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            "--trace" => trace = true,
            "--boot-rom" => {
                let v = it
                    .next()
                    .ok_or_else(|| "--boot-rom requires a value".to_string())?;
                boot_rom_path = Some(PathBuf::from(v));
            }
            "--frames" => {
                let v = it
                    .next()
                    .ok_or_else(|| "--frames requires a value".to_string())?;
                max_frames = Some(
                    v.parse::<u64>()
                        .map_err(|_| format!("invalid --frames value: {v}"))?,
                );
            }
            _ if arg.starts_with('-') => return Err(format!("unknown flag: {arg}")),
            _ => return Err(format!("unexpected extra positional arg: {arg}")),
        }
    }

    Ok(RunArgs {
        rom_path,
        boot_rom_path: boot_rom_path.ok_or("--boot-rom is required")?,
        max_frames,
        trace,
    })
}

fn parse_suite_args(args: &[String]) -> Result<SuiteArgs, String> {
    let mut rom_dir = PathBuf::from("roms");
    let mut boot_rom_path: Option<PathBuf> = None;
    let mut rom_paths: Vec<PathBuf> = Vec::new();
    let mut max_frames: Option<u64> = Some(3_600); // one minute of emulated time
    let mut pass_text = vec!["passed".to_string()];
    let mut fail_text = vec!["failed".to_string(), "fail".to_string()];

    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            "--boot-rom" => {
                let v = it
                    .next()
                    .ok_or_else(|| "--boot-rom requires a value".to_string())?;
                boot_rom_path = Some(PathBuf::from(v));
            }
            "--rom-dir" => {
                let v = it
                    .next()
                    .ok_or_else(|| "--rom-dir requires a value".to_string())?;
                rom_dir = PathBuf::from(v);
            }
            "--frames" => {
                let v = it
                    .next()
                    .ok_or_else(|| "--frames requires a value".to_string())?;
                max_frames = Some(
                    v.parse::<u64>()
                        .map_err(|_| format!("invalid --frames value: {v}"))?,
                );
            }
            "--pass-text" => {
                let v = it
                    .next()
                    .ok_or_else(|| "--pass-text requires a value".to_string())?;
                pass_text.push(v.to_string());
            }
            "--fail-text" => {
                let v = it
                    .next()
                    .ok_or_else(|| "--fail-text requires a value".to_string())?;
                fail_text.push(v.to_string());
            }
            _ if arg.starts_with('-') => return Err(format!("unknown flag: {arg}")),
            _ => rom_paths.push(PathBuf::from(arg)),
        }
    }

    Ok(SuiteArgs {
        rom_dir,
        boot_rom_path: boot_rom_path.ok_or("--boot-rom is required")?,
        rom_paths,
        max_frames,
        pass_text,
        fail_text,
    })
}

fn parse_self_test_args(args: &[String]) -> Result<SelfTestArgs, String> {
    let mut boot_rom_path: Option<PathBuf> = None;
    let mut max_frames: Option<u64> = Some(120);
    let mut pass_text = vec!["passed".to_string()];
    let mut fail_text = vec!["failed".to_string(), "fail".to_string()];

    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            "--boot-rom" => {
                let v = it
                    .next()
                    .ok_or_else(|| "--boot-rom requires a value".to_string())?;
                boot_rom_path = Some(PathBuf::from(v));
            }
            "--frames" => {
                let v = it
                    .next()
                    .ok_or_else(|| "--frames requires a value".to_string())?;
                max_frames = Some(
                    v.parse::<u64>()
                        .map_err(|_| format!("invalid --frames value: {v}"))?,
                );
            }
            "--pass-text" => {
                let v = it
                    .next()
                    .ok_or_else(|| "--pass-text requires a value".to_string())?;
                pass_text.push(v.to_string());
            }
            "--fail-text" => {
                let v = it
                    .next()
                    .ok_or_else(|| "--fail-text requires a value".to_string())?;
                fail_text.push(v.to_string());
            }
            _ if arg.starts_with('-') => return Err(format!("unknown flag: {arg}")),
            _ => return Err(format!("unexpected positional arg: {arg}")),
        }
    }

    Ok(SelfTestArgs {
        boot_rom_path: boot_rom_path.ok_or("--boot-rom is required")?,
        max_frames,
        pass_text,
        fail_text,
    })
}

fn discover_roms(dir: &Path) -> Result<Vec<PathBuf>, String> {
    fn visit(out: &mut Vec<PathBuf>, p: &Path) -> Result<(), String> {
        let rd = std::fs::read_dir(p)
            .map_err(|e| format!("failed to read ROM directory {}: {e}", p.display()))?;
        for ent in rd {
            let ent = ent.map_err(|e| format!("failed to read entry in {}: {e}", p.display()))?;
            let path = ent.path();
            if path.is_dir() {
                visit(out, &path)?;
                continue;
            }
            let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            if ext.eq_ignore_ascii_case("gb") {
                out.push(path);
            }
        }
        Ok(())
    }

    let mut out = Vec::new();
    visit(&mut out, dir)?;
    out.sort();
    Ok(out)
}

fn contains_any(haystack_lower: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|n| !n.is_empty() && haystack_lower.contains(&n.to_ascii_lowercase()))
}

/// Drives `engine` frame-by-frame, watching captured serial output for
/// pass/fail markers, until a verdict or `max_frames` is reached.
fn run_for_serial_result(
    engine: &mut Engine,
    max_frames: Option<u64>,
    pass_text: &[String],
    fail_text: &[String],
) -> (RomResult, Vec<u8>, u64) {
    let mut frames: u64 = 0;
    let mut output: Vec<u8> = Vec::new();

    loop {
        if max_frames.is_some_and(|m| frames >= m) {
            return (RomResult::Timeout, output, frames);
        }

        if engine.step_frame().is_err() {
            return (RomResult::Fail, output, frames);
        }
        frames += 1;

        let new = engine.take_serial_output();
        if !new.is_empty() {
            output.extend_from_slice(&new);
            let out_lower = String::from_utf8_lossy(&output).to_ascii_lowercase();
            if contains_any(&out_lower, fail_text) {
                return (RomResult::Fail, output, frames);
            }
            if contains_any(&out_lower, pass_text) {
                return (RomResult::Pass, output, frames);
            }
        }
    }
}

fn make_self_test_rom() -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000];

    let start = 0x0150usize;
    rom[0x0100] = 0xC3; // JP a16
    rom[0x0101] = (start & 0xFF) as u8;
    rom[0x0102] = (start >> 8) as u8;

    let mut pc = start;
    for &b in b"Passed\n" {
        rom[pc] = 0x3E; // LD A,d8
        rom[pc + 1] = b;
        pc += 2;
        rom[pc] = 0xEA; // LD (a16),A -> SB
        rom[pc + 1] = 0x01;
        rom[pc + 2] = 0xFF;
        pc += 3;
        rom[pc] = 0x3E; // LD A,0x81
        rom[pc + 1] = 0x81;
        pc += 2;
        rom[pc] = 0xEA; // LD (a16),A -> SC
        rom[pc + 1] = 0x02;
        rom[pc + 2] = 0xFF;
        pc += 3;
    }
    rom[pc] = 0x18; // JR -2 (infinite loop)
    rom[pc + 1] = 0xFE;

    rom[0x0147] = 0x00; // ROM only
    rom
}

fn load_boot_rom_or_err(path: &Path) -> Result<(), EngineError> {
    let bytes = std::fs::metadata(path).map_err(|source| EngineError::BootRomRead {
        path: path.display().to_string(),
        source,
    })?;
    if bytes.len() != 0x100 {
        return Err(EngineError::BootRomWrongSize(bytes.len() as usize));
    }
    Ok(())
}

fn run_single(args: RunArgs) -> Result<i32, String> {
    load_boot_rom_or_err(&args.boot_rom_path).map_err(|e| e.to_string())?;

    let mut engine = Engine::new(&args.rom_path, Some(&args.boot_rom_path))
        .map_err(|e| format!("failed to start engine: {e}"))?;

    log::info!("loaded ROM: {}", engine.title());

    let mut frames: u64 = 0;
    loop {
        if args.max_frames.is_some_and(|m| frames >= m) {
            break;
        }

        if args.trace {
            let pc = engine.cpu().pc;
            let (text, _) = gb_core::disassembler::disassemble_one(engine.bus_mut(), pc);
            log::debug!("{pc:#06x}: {text}");
        }

        engine
            .step_frame()
            .map_err(|e| format!("CPU halted on illegal opcode: {e}"))?;
        frames += 1;

        let bytes = engine.take_serial_output();
        if !bytes.is_empty() {
            use std::io::Write;
            std::io::stdout().write_all(&bytes).ok();
        }
    }

    Ok(0)
}

fn run_suite(args: SuiteArgs) -> Result<i32, String> {
    load_boot_rom_or_err(&args.boot_rom_path).map_err(|e| e.to_string())?;

    let roms = if args.rom_paths.is_empty() {
        discover_roms(&args.rom_dir)?
    } else {
        args.rom_paths
    };

    if roms.is_empty() {
        return Err(format!("no ROMs found under {}", args.rom_dir.display()));
    }

    let mut failures = 0usize;
    for rom_path in &roms {
        let mut engine = match Engine::new(rom_path, Some(&args.boot_rom_path)) {
            Ok(e) => e,
            Err(e) => {
                println!("{:8} {}  ({e})", "ERROR", rom_path.display());
                failures += 1;
                continue;
            }
        };

        let (result, _output, frames) = run_for_serial_result(
            &mut engine,
            args.max_frames,
            &args.pass_text,
            &args.fail_text,
        );
        println!(
            "{:8} {}  ({frames} frames)",
            result.as_str(),
            rom_path.display()
        );
        if result != RomResult::Pass {
            failures += 1;
        }
    }

    Ok(if failures == 0 { 0 } else { 1 })
}

fn run_self_test(args: SelfTestArgs) -> Result<i32, String> {
    load_boot_rom_or_err(&args.boot_rom_path).map_err(|e| e.to_string())?;

    let dir = std::env::temp_dir();
    let rom_path = dir.join("gb_cli_self_test.gb");
    std::fs::write(&rom_path, make_self_test_rom())
        .map_err(|e| format!("failed to write self-test ROM: {e}"))?;

    let mut engine = Engine::new(&rom_path, Some(&args.boot_rom_path))
        .map_err(|e| format!("failed to start engine: {e}"))?;
    std::fs::remove_file(&rom_path).ok();

    let (result, output, frames) = run_for_serial_result(
        &mut engine,
        args.max_frames,
        &args.pass_text,
        &args.fail_text,
    );

    println!(
        "{:8} self-test  ({frames} frames, {} bytes of serial output)",
        result.as_str(),
        output.len()
    );

    Ok(if result == RomResult::Pass { 0 } else { 1 })
}

fn main() {
    env_logger::init();

    let command = match parse_args() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}\n");
            print_usage();
            std::process::exit(2);
        }
    };

    let result = match command {
        Command::Run(args) => run_single(args),
        Command::Suite(args) => run_suite(args),
        Command::SelfTest(args) => run_self_test(args),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    }
}
