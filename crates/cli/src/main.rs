use anyhow::{anyhow, Context, Result};
use catalog::{CatalogIndex, ContentDao, TargetingGroupDao};
use clap::{Parser, Subcommand};
use colored::Colorize;
use selector::{AdvertisementSelector, GeneratedAdvertisement};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// ad-select - Advertisement selection engine
#[derive(Parser)]
#[command(name = "ad-select")]
#[command(about = "Selects the highest click-through-rate advertisement a customer is eligible for", long_about = None)]
struct Cli {
    /// Path to the catalog directory (contents.dat, targeting_groups.dat)
    #[arg(short, long, default_value = "data/catalog")]
    data_dir: PathBuf,

    /// Maximum predicates evaluated concurrently per targeting group
    #[arg(long, default_value = "8")]
    max_concurrency: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select the advertisement to render for a customer
    Select {
        /// Customer to select an advertisement for (empty for anonymous)
        #[arg(long, default_value = "")]
        customer_id: String,

        /// Marketplace the advertisement will be rendered on
        #[arg(long, default_value = "")]
        marketplace_id: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the content and targeting groups of a marketplace
    Contents {
        /// Marketplace to display
        #[arg(long)]
        marketplace_id: String,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of selections to make
        #[arg(long, default_value = "1000")]
        requests: usize,

        /// Number of concurrent selections
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let start = Instant::now();
    let index = Arc::new(
        CatalogIndex::load_from_dir(&cli.data_dir).context("Failed to load advertisement catalog")?,
    );
    let (contents, groups) = index.counts();
    println!(
        "{} Loaded {} contents and {} targeting groups in {:?}",
        "✓".green(),
        contents,
        groups,
        start.elapsed()
    );

    let selector = AdvertisementSelector::new(
        Arc::new(ContentDao::new(index.clone())),
        Arc::new(TargetingGroupDao::new(index.clone())),
    )
    .with_max_concurrent_predicates(cli.max_concurrency);

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Select {
            customer_id,
            marketplace_id,
            json,
        } => handle_select(&selector, &customer_id, &marketplace_id, json).await?,
        Commands::Contents { marketplace_id } => handle_contents(&index, &marketplace_id)?,
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(&index, selector, requests, concurrent).await?,
    }

    Ok(())
}

/// Handle the 'select' command
async fn handle_select(
    selector: &AdvertisementSelector,
    customer_id: &str,
    marketplace_id: &str,
    json: bool,
) -> Result<()> {
    let advertisement = selector
        .select_advertisement(customer_id, marketplace_id)
        .await
        .context("Advertisement selection failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&advertisement)?);
        return Ok(());
    }

    match advertisement {
        GeneratedAdvertisement::Selected { content } => {
            println!("{}", "Selected advertisement:".bold().blue());
            println!("{}Content: {}", "• ".green(), content.content_id);
            println!("{}Marketplace: {}", "• ".green(), content.marketplace_id);
            println!("{}Renderable: {}", "• ".green(), content.renderable_data);
        }
        GeneratedAdvertisement::Empty => {
            println!(
                "{} No eligible advertisement for customer '{}' in marketplace '{}'",
                "∅".yellow(),
                customer_id,
                marketplace_id
            );
        }
    }
    Ok(())
}

/// Handle the 'contents' command
fn handle_contents(index: &CatalogIndex, marketplace_id: &str) -> Result<()> {
    let contents = index.get_contents(marketplace_id);
    if contents.is_empty() {
        return Err(anyhow!("No content registered for marketplace {}", marketplace_id));
    }

    println!(
        "{}",
        format!("Marketplace {} ({} contents):", marketplace_id, contents.len())
            .bold()
            .blue()
    );
    for content in contents {
        println!("{}{}", "• ".green(), content.content_id.bold());
        println!("    {}", content.renderable_data);

        let mut groups: Vec<_> = index.get_targeting_groups(&content.content_id).iter().collect();
        groups.sort_by(|a, b| {
            b.click_through_rate
                .partial_cmp(&a.click_through_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if groups.is_empty() {
            println!("    {}", "(no targeting groups)".dimmed());
        }
        for group in groups {
            let predicates = group
                .predicates()
                .iter()
                .map(|p| p.name().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            println!(
                "    - {} ctr {:.3} [{}]",
                group.targeting_group_id,
                group.click_through_rate,
                if predicates.is_empty() { "always eligible".to_string() } else { predicates }
            );
        }
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    index: &CatalogIndex,
    selector: AdvertisementSelector,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    let marketplaces: Vec<String> = index.marketplaces().into_iter().map(String::from).collect();
    if marketplaces.is_empty() {
        return Err(anyhow!("Catalog has no marketplaces to benchmark"));
    }
    let concurrent = concurrent.max(1);

    // Random customer/marketplace pairs, including anonymous customers
    let mut pending = (0..requests).map(|_| {
        let marketplace = marketplaces[rand::random::<u32>() as usize % marketplaces.len()].clone();
        let customer = match rand::random::<u32>() % 10 {
            0 => String::new(),
            n => format!("customer-{}", n),
        };
        (customer, marketplace)
    });

    let wall_clock = Instant::now();
    let mut in_flight = JoinSet::new();
    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    let mut selected = 0usize;

    for (customer, marketplace) in pending.by_ref().take(concurrent) {
        spawn_selection(&mut in_flight, &selector, customer, marketplace);
    }
    while let Some(joined) = in_flight.join_next().await {
        let (elapsed, advertisement) = joined.context("Benchmark task panicked")??;
        timings.push(elapsed);
        if !advertisement.is_empty() {
            selected += 1;
        }
        if let Some((customer, marketplace)) = pending.next() {
            spawn_selection(&mut in_flight, &selector, customer, marketplace);
        }
    }
    let total_time = wall_clock.elapsed();

    if timings.is_empty() {
        println!("No requests were made");
        return Ok(());
    }

    timings.sort();
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let throughput = timings.len() as f32 / total_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} selected an ad)", timings.len(), selected);
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

fn spawn_selection(
    in_flight: &mut JoinSet<Result<(Duration, GeneratedAdvertisement)>>,
    selector: &AdvertisementSelector,
    customer: String,
    marketplace: String,
) {
    let selector = selector.clone();
    in_flight.spawn(async move {
        let start = Instant::now();
        let advertisement = selector.select_advertisement(&customer, &marketplace).await?;
        Ok((start.elapsed(), advertisement))
    });
}
