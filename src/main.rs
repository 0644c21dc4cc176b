use anyhow::{bail, Context, Result};
use serde::Serialize;

use growthlens::models::{ImportanceTarget, PredictionPayload, SimulationRequest};
use growthlens::{Config, GrowthClient};

const USAGE: &str = "usage: growthlens <command> [args]

commands:
  predict <uploads> <category> <country> <age>
  recommend <uploads> <category> <country> <age>
  simulate <category> <country> <age> <start_uploads> <end_uploads> <step>
  importance <subscribers|earnings|growth> [top_n]
  clusters
  countries
  categories [top_n]
  buckets
  sample [limit]
  raw [limit]
  health
  ready
  diagnostics";

fn arg<T: std::str::FromStr>(args: &[String], idx: usize, name: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    let raw = args.get(idx).with_context(|| format!("missing <{}>\n\n{}", name, USAGE))?;
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("invalid <{}> '{}': {}", name, raw, e))
}

fn opt_arg<T: std::str::FromStr>(args: &[String], idx: usize, name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    if args.get(idx).is_some() {
        arg(args, idx, name)
    } else {
        Ok(default)
    }
}

fn payload(args: &[String]) -> Result<PredictionPayload> {
    Ok(PredictionPayload {
        uploads: arg(args, 1, "uploads")?,
        category: arg(args, 2, "category")?,
        country: arg(args, 3, "country")?,
        age: arg(args, 4, "age")?,
    })
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let client = GrowthClient::new(Config::from_env())?;

    match command {
        "predict" => print(&client.predict(&payload(&args)?).await?)?,
        "recommend" => print(&client.recommend(&payload(&args)?).await?)?,
        "simulate" => {
            let request = SimulationRequest {
                category: arg(&args, 1, "category")?,
                country: arg(&args, 2, "country")?,
                age: arg(&args, 3, "age")?,
                start_uploads: arg(&args, 4, "start_uploads")?,
                end_uploads: arg(&args, 5, "end_uploads")?,
                step: arg(&args, 6, "step")?,
            };
            print(&client.simulate(&request).await?)?
        }
        "importance" => {
            let target: ImportanceTarget = arg(&args, 1, "target")?;
            let top_n = opt_arg(&args, 2, "top_n", 15usize)?;
            print(&client.feature_importance(target, top_n).await?)?
        }
        "clusters" => print(&client.cluster_summary().await?)?,
        "countries" => print(&client.country_metrics().await?)?,
        "categories" => {
            let top_n = opt_arg(&args, 1, "top_n", 12usize)?;
            print(&client.category_performance(top_n).await?)?
        }
        "buckets" => print(&client.upload_growth_buckets().await?)?,
        "sample" => {
            let limit = opt_arg(&args, 1, "limit", 10usize)?;
            print(&client.processed_sample(limit).await?)?
        }
        "raw" => {
            let limit = opt_arg(&args, 1, "limit", 10usize)?;
            print(&client.raw_sample(limit).await?)?
        }
        "health" => print(&client.health().await?)?,
        "ready" => print(&client.readiness().await?)?,
        "diagnostics" => {}
        other => bail!("unknown command '{}'\n\n{}", other, USAGE),
    }

    let diagnostics = client.diagnostics();
    if diagnostics.offline.offline_fallback || command == "diagnostics" {
        eprintln!("{}", serde_json::to_string(&diagnostics)?);
    }
    Ok(())
}
