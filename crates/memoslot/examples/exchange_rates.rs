// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Caching a flaky upstream with log output enabled.
//!
//! Run with `cargo run --example exchange_rates --features logs`. The upstream fails on its
//! second call; the failure is cached and served until the next refresh.

use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

use memoslot::{Failure, MaxAge, Mem, NowClock, ProduceFn};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("memoslot=trace")))
        .init();

    let rates = Mem::<f64>::builder().name("eur_usd").build();
    let policy = MaxAge::new(Duration::from_millis(300));
    let calls = AtomicU32::new(0);

    let upstream = ProduceFn(|| {
        let call = calls.fetch_add(1, Ordering::Relaxed) + 1;
        if call == 2 {
            return Err(Failure::from_message("rate service timed out"));
        }
        Ok(1.08 + f64::from(call) / 100.0)
    });

    for round in 0..8 {
        match rates.dedup(&upstream, &NowClock, &policy).get() {
            Ok(rate) => println!("round {round}: EUR/USD = {rate:.4}"),
            Err(failure) => println!("round {round}: no rate ({failure})"),
        }
        thread::sleep(Duration::from_millis(100));
    }
}
