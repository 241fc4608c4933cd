// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::collections::BTreeMap;
use std::time::Instant;

use anyhow::{bail, Context};
use futures::stream::{self, StreamExt};
use serde::Serialize;

use wmclient::cli::{parse_header_arg, BulkArgs, OutputFormat};
use wmclient::{DeviceResult, WmClient};

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_list(items: &[String], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(items),
        OutputFormat::Text => {
            for item in items {
                println!("{}", item);
            }
            Ok(())
        }
    }
}

fn print_device(device: &DeviceResult, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(device);
    }

    println!("wurfl_id: {}", device.wurfl_id().unwrap_or("-"));
    if let Some(created) = device.created_at() {
        println!("mtime:    {}", created.to_rfc3339());
    }
    println!("capabilities ({}):", WmClient::capability_count(Some(device)));
    for (name, value) in &device.capabilities {
        println!("  {:<32} {}", name, value);
    }
    Ok(())
}

pub async fn run_info(client: &WmClient, format: OutputFormat) -> anyhow::Result<()> {
    let info = client.get_info().await?;
    if format == OutputFormat::Json {
        return print_json(&info);
    }

    println!("Server version:    {}", info.wm_version);
    println!("WURFL API version: {}", info.wurfl_api_version);
    println!("WURFL info:        {}", info.wurfl_info);
    println!("Client API:        {}", client.api_version());
    if let Some(ltime) = &info.ltime {
        println!("Loaded at:         {}", ltime);
    }
    println!("Important headers: {}", client.important_headers().join(", "));
    println!("Static capabilities:  {}", client.static_capabilities().len());
    println!("Virtual capabilities: {}", client.virtual_capabilities().len());
    Ok(())
}

pub async fn run_lookup_ua(
    client: &WmClient,
    user_agent: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let device = client.lookup_user_agent(user_agent).await?;
    print_device(&device, format)
}

pub async fn run_lookup_id(
    client: &WmClient,
    wurfl_id: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let device = client.lookup_device_id(wurfl_id).await?;
    print_device(&device, format)
}

pub async fn run_lookup_headers(
    client: &WmClient,
    args: &[String],
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut headers = BTreeMap::new();
    for arg in args {
        let Some((name, value)) = parse_header_arg(arg) else {
            bail!("invalid header '{}', expected NAME=VALUE", arg);
        };
        headers.insert(name, value);
    }
    let device = client.lookup_request(&headers).await?;
    print_device(&device, format)
}

pub async fn run_makes(client: &WmClient, format: OutputFormat) -> anyhow::Result<()> {
    let makes = client.get_all_device_makes().await?;
    print_list(&makes, format)
}

pub async fn run_devices(client: &WmClient, make: &str, format: OutputFormat) -> anyhow::Result<()> {
    let devices = client.get_all_devices_for_make(make).await?;
    if format == OutputFormat::Json {
        return print_json(&devices);
    }

    for device in &devices {
        match &device.marketing_name {
            Some(marketing) => println!("{} ({})", device.model_name, marketing),
            None => println!("{}", device.model_name),
        }
    }
    Ok(())
}

pub async fn run_oses(client: &WmClient, format: OutputFormat) -> anyhow::Result<()> {
    let oses = client.get_all_oses().await?;
    print_list(&oses, format)
}

pub async fn run_versions(client: &WmClient, os: &str, format: OutputFormat) -> anyhow::Result<()> {
    let versions = client.get_all_versions_for_os(os).await?;
    print_list(&versions, format)
}

#[derive(Debug, Default, Serialize)]
struct BulkSummary {
    lookups: usize,
    succeeded: usize,
    failed: usize,
    elapsed_ms: u128,
    lookups_per_sec: f64,
    cache: wmclient::CacheStats,
}

pub async fn run_bulk(client: &WmClient, args: &BulkArgs, format: OutputFormat) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let agents: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let started = Instant::now();
    let outcomes: Vec<bool> = stream::iter(agents.iter().copied())
        .map(|ua| async move {
            match client.lookup_user_agent(ua).await {
                Ok(_) => true,
                Err(e) => {
                    tracing::warn!(user_agent = ua, error = %e, "lookup failed");
                    false
                }
            }
        })
        .buffer_unordered(args.concurrency.max(1))
        .collect()
        .await;
    let elapsed = started.elapsed();

    let succeeded = outcomes.iter().filter(|ok| **ok).count();
    let summary = BulkSummary {
        lookups: outcomes.len(),
        succeeded,
        failed: outcomes.len() - succeeded,
        elapsed_ms: elapsed.as_millis(),
        lookups_per_sec: if elapsed.as_secs_f64() > 0.0 {
            outcomes.len() as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        },
        cache: client.cache_stats(),
    };

    if format == OutputFormat::Json {
        return print_json(&summary);
    }

    println!("Lookups:     {}", summary.lookups);
    println!("Succeeded:   {}", summary.succeeded);
    println!("Failed:      {}", summary.failed);
    println!("Elapsed:     {} ms", summary.elapsed_ms);
    println!("Throughput:  {:.1} lookups/s", summary.lookups_per_sec);
    println!(
        "Cache:       {} hits, {} misses, {} header entries",
        summary.cache.hits, summary.cache.misses, summary.cache.header_entries
    );
    Ok(())
}
