//! Parada do loop agendado por sinal
//!
//! O primeiro SIGINT/SIGTERM cancela o token: o ciclo corrente termina e o
//! despachante drena a fila. Um segundo sinal encerra o processo na hora.

use std::io;

use udara_gas::CancelToken;

/// Código de saída após um segundo sinal
pub const FORCED_EXIT_CODE: i32 = 130;

/// Liga SIGINT e SIGTERM ao token
#[cfg(unix)]
pub fn cancel_on_signal(stop: &CancelToken) -> io::Result<()> {
    use signal_hook::consts::signal::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    let stop = stop.clone();

    std::thread::Builder::new()
        .name("udara-signal-listener".to_owned())
        .spawn(move || {
            for signal in signals.forever() {
                if stop.is_cancelled() {
                    tracing::error!(signal, "second stop signal, exiting without draining");
                    std::process::exit(FORCED_EXIT_CODE);
                }
                tracing::warn!(signal, "stop requested, finishing current cycle");
                stop.cancel();
            }
        })?;

    Ok(())
}

#[cfg(not(unix))]
pub fn cancel_on_signal(_stop: &CancelToken) -> io::Result<()> {
    tracing::warn!("stop signals not supported on this platform; bound the run with --cycles");
    Ok(())
}
