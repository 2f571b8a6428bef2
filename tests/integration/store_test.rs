//! Persistence across restarts

use crate::support::id;
use pricewatch::cli::AppContext;
use pricewatch::config::Config;
use pricewatch::watch::Subscriber;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> Config {
    let toml = format!(
        "[store]\nwatchlist_path = {:?}\nbaselines_path = {:?}\n[notifier]\nkind = \"log\"\n",
        dir.path().join("watchlist.json"),
        dir.path().join("targets.json"),
    );
    Config::parse(&toml).unwrap()
}

#[tokio::test]
async fn test_watch_entries_survive_restart() {
    let dir = TempDir::new().unwrap();

    {
        let ctx = AppContext::open(config_in(&dir)).await.unwrap();
        ctx.service
            .seed(&id("dogecoin"), Subscriber::from(42), dec!(0.12))
            .await
            .unwrap();
        ctx.service
            .seed(&id("pepe"), Subscriber::from(7), dec!(0.00001))
            .await
            .unwrap();
        ctx.service.unsubscribe(&id("pepe")).await.unwrap();
    }

    let ctx = AppContext::open(config_in(&dir)).await.unwrap();
    let listed = ctx.service.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id("dogecoin"));
    assert_eq!(listed[0].subscriber, Subscriber::from(42));
    assert_eq!(listed[0].baseline, Some(dec!(0.12)));
}

#[tokio::test]
async fn test_reads_documents_written_by_other_tools() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("watchlist.json"),
        r#"{"shiba-inu": 123456789, "bitcoin": "-100200"}"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("targets.json"), r#"{"shiba-inu": 0.0000245}"#).unwrap();

    let ctx = AppContext::open(config_in(&dir)).await.unwrap();
    let listed = ctx.service.list().await.unwrap();

    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, id("bitcoin"));
    assert_eq!(listed[0].subscriber, Subscriber::from(-100200));
    assert_eq!(listed[0].baseline, None);
    assert_eq!(listed[1].subscriber, Subscriber::from(123456789));
    assert_eq!(listed[1].baseline, Some(dec!(0.0000245)));
}

#[tokio::test]
async fn test_corrupt_watch_list_refuses_to_start() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("watchlist.json"), "{\"bitcoin\": ").unwrap();

    let err = AppContext::open(config_in(&dir)).await.err().unwrap();
    assert!(err.to_string().contains("watch store"));

    // The unreadable document is left for the operator to inspect
    let content = std::fs::read_to_string(dir.path().join("watchlist.json")).unwrap();
    assert_eq!(content, "{\"bitcoin\": ");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_processes_sharing_documents_keep_all_entries() {
    let dir = TempDir::new().unwrap();
    let daemon = AppContext::open(config_in(&dir)).await.unwrap();
    let cli = AppContext::open(config_in(&dir)).await.unwrap();

    let seed_all = |ctx: AppContext, prefix: &'static str| {
        tokio::spawn(async move {
            for i in 0..20i64 {
                ctx.service
                    .seed(&id(&format!("{}{}", prefix, i)), Subscriber::from(i), Decimal::from(i + 1))
                    .await
                    .unwrap();
            }
        })
    };
    let a = seed_all(daemon, "daemon");
    let b = seed_all(cli, "cli");
    a.await.unwrap();
    b.await.unwrap();

    let ctx = AppContext::open(config_in(&dir)).await.unwrap();
    let listed = ctx.service.list().await.unwrap();
    assert_eq!(listed.len(), 40);
    assert!(listed.iter().all(|w| w.baseline.is_some()));
}
