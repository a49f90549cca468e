// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A service object that owns its cache and knows how to refresh it.
//!
//! Several worker threads ask the same `Catalog` for its product list. The list is loaded once
//! and served from the cache until it is older than the configured age.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, SystemTime};

use memoslot::{Clock, Failure, MaxAge, Mem, Policy, Producer, Timed};

struct Catalog {
    cache: Mem<Vec<String>>,
    max_age: MaxAge,
    loads: AtomicUsize,
}

impl Catalog {
    fn new(max_age: Duration) -> Self {
        Self {
            cache: Mem::builder().name("catalog").build(),
            max_age: MaxAge::new(max_age),
            loads: AtomicUsize::new(0),
        }
    }
}

impl Producer<Vec<String>> for Catalog {
    fn produce(&self) -> Result<Vec<String>, Failure> {
        self.loads.fetch_add(1, Ordering::Relaxed);

        // Stand-in for a slow database query.
        thread::sleep(Duration::from_millis(200));
        Ok(vec!["keyboard".to_string(), "mouse".to_string(), "monitor".to_string()])
    }
}

impl Clock for Catalog {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

impl Policy<Vec<String>> for Catalog {
    fn is_expired(&self, timed: &Timed<Vec<String>>) -> bool {
        self.max_age.is_expired(timed)
    }
}

impl AsRef<Mem<Vec<String>>> for Catalog {
    fn as_ref(&self) -> &Mem<Vec<String>> {
        &self.cache
    }
}

fn main() {
    let catalog = Catalog::new(Duration::from_secs(60));

    thread::scope(|s| {
        for worker in 0..4 {
            let catalog = &catalog;
            s.spawn(move || {
                let products: Timed<Vec<String>> = memoslot::dedup(catalog);
                match products.get() {
                    Ok(products) => println!("worker {worker}: {} products", products.len()),
                    Err(failure) => println!("worker {worker}: catalog unavailable: {failure}"),
                }
            });
        }
    });

    println!("catalog loaded {} time(s)", catalog.loads.load(Ordering::Relaxed));
}
