//! Interactive pool demo
//!
//! Submits batches of slow random tasks and lets the operator watch the
//! pool grow, shrink and terminate.
//!
//! Pool bounds come from `DYNPOOL_MIN_WORKERS`, `DYNPOOL_MAX_WORKERS` and
//! `DYNPOOL_MAX_QUEUE_SIZE` (defaults 4 / 8 / 100).

use dynpool::{PoolConfig, PoolResult, TaskHandle, ThreadPool};
use std::cell::Cell;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

const BATCH_1: usize = 50;
const BATCH_2: usize = 30;
const CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    SubmitBatch1,
    SubmitBatch2,
    CollectResults,
    ShowStatus,
    Help,
    Quit,
    Terminate,
    Unknown,
}

fn parse_command(line: &str) -> Command {
    match line.trim() {
        "1" => Command::SubmitBatch1,
        "2" => Command::SubmitBatch2,
        "r" => Command::CollectResults,
        "p" => Command::ShowStatus,
        "h" => Command::Help,
        "q" => Command::Quit,
        "t" => Command::Terminate,
        _ => Command::Unknown,
    }
}

fn print_help() {
    println!("1: submit {} times the task1 (random number)", BATCH_1);
    println!("2: submit {} times the task2 (random string)", BATCH_2);
    println!("r: retrieve all the results");
    println!("h: print this help message");
    println!("q: terminate the thread-pool and quit");
    println!("p: show the thread-pool status");
    println!("t: terminate the thread-pool");
}

// xorshift64*, seeded per thread from the std hasher's random keys
fn next_random() -> u64 {
    thread_local! {
        static STATE: Cell<u64> = Cell::new(RandomState::new().build_hasher().finish() | 1);
    }
    STATE.with(|s| {
        let mut x = s.get();
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        s.set(x);
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    })
}

fn random_string(min_len: usize, max_len: usize) -> String {
    let len = min_len + (next_random() as usize) % (max_len - min_len);
    (0..len)
        .map(|_| CHARSET[(next_random() as usize) % CHARSET.len()] as char)
        .collect()
}

fn submit_task1(pool: &ThreadPool) -> PoolResult<TaskHandle<u32>> {
    pool.submit(|| {
        thread::sleep(Duration::from_millis(300));
        (next_random() % i32::MAX as u64) as u32
    })
}

fn submit_task2(pool: &ThreadPool) -> PoolResult<TaskHandle<String>> {
    pool.submit(|| {
        thread::sleep(Duration::from_millis(700));
        random_string(30, 80)
    })
}

fn menu(pool: &ThreadPool) -> PoolResult<()> {
    let mut numbers: Vec<TaskHandle<u32>> = Vec::with_capacity(BATCH_1);
    let mut strings: Vec<TaskHandle<String>> = Vec::with_capacity(BATCH_2);

    println!("=== MENU ===");
    print_help();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("command: ");
        let _ = io::stdout().flush();

        let line = match lines.next() {
            Some(Ok(line)) => line,
            // EOF or unreadable stdin behaves like quit
            _ => return Ok(()),
        };

        match parse_command(&line) {
            Command::Quit => return Ok(()),
            Command::SubmitBatch1 => {
                numbers.clear();
                for _ in 0..BATCH_1 {
                    numbers.push(submit_task1(pool)?);
                }
            }
            Command::SubmitBatch2 => {
                strings.clear();
                for _ in 0..BATCH_2 {
                    strings.push(submit_task2(pool)?);
                }
            }
            Command::CollectResults => {
                for (i, handle) in numbers.drain(..).enumerate() {
                    match handle.wait() {
                        Ok(v) => println!("Task1 {} : {}", i, v),
                        Err(e) => println!("Task1 {} : {}", i, e),
                    }
                }
                for (i, handle) in strings.drain(..).enumerate() {
                    match handle.wait() {
                        Ok(v) => println!("Task2 {} : {}", i, v),
                        Err(e) => println!("Task2 {} : {}", i, e),
                    }
                }
            }
            Command::ShowStatus => print!("{}", pool.status()),
            Command::Help => print_help(),
            Command::Terminate => pool.terminate(),
            Command::Unknown => println!("Unknown command"),
        }
    }
}

fn warm_up(pool: &ThreadPool) -> PoolResult<()> {
    let v = vec![10, 9, 23, 4, 0];
    let sorted = pool.submit(move || {
        let mut v = v;
        v.sort_unstable();
        v
    })?;
    if let Ok(v) = sorted.wait() {
        let line: Vec<String> = v.iter().map(|x| x.to_string()).collect();
        println!("{}", line.join(" "));
    }

    let greeting = "ciao".to_string();
    let _ = pool.submit(move || println!("{}", greeting))?.wait();
    Ok(())
}

fn main() -> ExitCode {
    let config = PoolConfig::from_env();
    let pool = match ThreadPool::with_config(config) {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match warm_up(&pool).and_then(|_| menu(&pool)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("1"), Command::SubmitBatch1);
        assert_eq!(parse_command(" r \n"), Command::CollectResults);
        assert_eq!(parse_command("t"), Command::Terminate);
        assert_eq!(parse_command("x"), Command::Unknown);
    }

    #[test]
    fn test_random_string_bounds() {
        for _ in 0..100 {
            let s = random_string(30, 80);
            assert!((30..80).contains(&s.len()));
            assert!(s.bytes().all(|b| CHARSET.contains(&b)));
        }
    }

    #[test]
    fn test_submit_after_terminate_reports_error() {
        let pool = ThreadPool::new(1, 2, 4).unwrap();
        pool.terminate();
        assert!(submit_task1(&pool).is_err());
    }
}
