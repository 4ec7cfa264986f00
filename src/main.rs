use gossip_sim::message::types::Payload;
use gossip_sim::simulator::{Simulator, SimulatorConfig};
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_usage(program_name(&args));
        return Ok(());
    }

    let verbose = args.iter().any(|arg| arg == "--verbose");
    tracing_subscriber::fmt()
        .with_max_level(if verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let mut config = SimulatorConfig::default();
    let mut origin = "node-0".to_string();
    let mut key = "x".to_string();
    let mut timeout = Duration::from_secs(2);

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match (args[i].as_str(), value) {
            ("--config", Some(path)) => {
                let raw = std::fs::read_to_string(path)?;
                config = serde_json::from_str(&raw)?;
                i += 2;
            }
            ("--nodes", Some(v)) => {
                config.node_count = v.parse()?;
                i += 2;
            }
            ("--fanout", Some(v)) => {
                config.fanout = v.parse()?;
                i += 2;
            }
            ("--latency-ms", Some(v)) => {
                config.latency_us = v.parse::<u64>()?.saturating_mul(1_000);
                i += 2;
            }
            ("--jitter-ms", Some(v)) => {
                config.jitter_us = v.parse::<u64>()?.saturating_mul(1_000);
                i += 2;
            }
            ("--drop-rate", Some(v)) => {
                config.drop_rate = v.parse()?;
                i += 2;
            }
            ("--seed", Some(v)) => {
                config.seed = Some(v.parse()?);
                i += 2;
            }
            ("--rumor-rounds", Some(v)) => {
                config.rumor_rounds = v.parse()?;
                i += 2;
            }
            ("--from", Some(v)) => {
                origin = v.clone();
                i += 2;
            }
            ("--key", Some(v)) => {
                key = v.clone();
                i += 2;
            }
            ("--timeout-ms", Some(v)) => {
                timeout = Duration::from_millis(v.parse()?);
                i += 2;
            }
            ("--verbose", _) => {
                i += 1;
            }
            (other, _) => {
                tracing::warn!("Ignoring unrecognised argument: {}", other);
                i += 1;
            }
        }
    }

    let sim = Simulator::with_config(config)?;

    let mut payload = Payload::new();
    payload.insert(key.clone(), serde_json::json!(1));

    let started = Instant::now();
    let message_id = sim.broadcast_from(&origin, "set", payload)?;
    tracing::info!("Broadcast {} from {}", message_id, origin);

    let converged = sim.wait_for_convergence(&key, timeout).await;
    let elapsed = started.elapsed();
    let report = sim.convergence_report(&key);

    if converged {
        tracing::info!("Converged in {:?}", elapsed);
    } else {
        tracing::warn!(
            "No convergence after {:?}: {}/{} nodes agree",
            elapsed,
            report.agreeing_nodes,
            report.total_nodes
        );
    }

    sim.shutdown();

    let stats = sim.get_stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// argv[0], or the binary name when the platform passes an empty argv.
fn program_name(args: &[String]) -> &str {
    args.first().map(String::as_str).unwrap_or("gossip-sim")
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [options]", program);
    eprintln!("  --config <file.json>   load a SimulatorConfig");
    eprintln!("  --nodes <n>            number of nodes (default 10)");
    eprintln!("  --fanout <n>           peers per forward (default 3)");
    eprintln!("  --latency-ms <ms>      per-hop delay (default 5)");
    eprintln!("  --jitter-ms <ms>       extra random per-hop delay (default 0)");
    eprintln!("  --drop-rate <p>        loss probability in [0, 1] (default 0)");
    eprintln!("  --seed <n>             reproducible topology, selection and loss");
    eprintln!("  --rumor-rounds <n>     re-push rounds per message (default 8)");
    eprintln!("  --from <node-id>       broadcast origin (default node-0)");
    eprintln!("  --key <key>            state key to broadcast and watch (default x)");
    eprintln!("  --timeout-ms <ms>      convergence timeout (default 2000)");
    eprintln!("  --verbose              debug logging");
    eprintln!("Example: {} --nodes 50 --fanout 4 --drop-rate 0.1 --seed 7", program);
}

#[cfg(test)]
mod tests {
    use super::program_name;

    #[test]
    fn test_program_name_tolerates_empty_argv() {
        assert_eq!(program_name(&[]), "gossip-sim");
        assert_eq!(program_name(&["./sim".to_string()]), "./sim");
    }
}
