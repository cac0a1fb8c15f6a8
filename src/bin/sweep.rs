use std::path::PathBuf;
use std::sync::OnceLock;

use vectorstar::{write_session, CancelToken, SweepConfig, Vna};

const RESOURCE: &str = "TCPIP::169.254.63.67::INSTR";
const OUTPUT_DIR: &str = "sweep_data";
const NUM_SWEEPS: usize = 10;

static CANCEL: OnceLock<CancelToken> = OnceLock::new();

extern "C" fn on_interrupt(_signal: libc::c_int) {
    // only flips an atomic, which is safe inside a signal handler
    if let Some(token) = CANCEL.get() {
        token.cancel();
    }
}

fn main() -> vectorstar::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let resource = args.next().unwrap_or_else(|| RESOURCE.to_owned());
    let directory = PathBuf::from(args.next().unwrap_or_else(|| OUTPUT_DIR.to_owned()));
    let num_sweeps = args.next()
        .map(|arg| arg.parse().expect("sweep count must be a number"))
        .unwrap_or(NUM_SWEEPS);

    let cancel = CANCEL.get_or_init(CancelToken::new).clone();
    let handler = on_interrupt as extern "C" fn(libc::c_int);
    unsafe { libc::signal(libc::SIGINT, handler as libc::sighandler_t) };

    let config = SweepConfig {
        num_sweeps,
        if_bandwidth: Some(1000.0),
        freq_start: Some(1e9),
        freq_stop: Some(150e9),
        points: Some(299),
        power_standard: Some(-10.0),
        power_extended: Some(-10.0),
        ..Default::default()
    };

    let mut vna = Vna::connect(&resource, &config)?;
    let log = vna.raw_sweep(&config, &cancel)?;
    if cancel.is_cancelled() {
        println!("sweep cancelled; keeping {} completed sweep(s)", log.sweeps.len());
    }

    println!("acquired {} sweep(s) of {} points", log.sweeps.len(),
        log.frequencies.len());
    write_session(&directory, "sweep", &log)?;
    println!("wrote touchstone files to {}", directory.display());
    Ok(())
}
