use std::thread;
use std::time::Duration;

use tasklink::AsyncTask;
use tasklink::adapter::{Callback, from_callbacks, from_future};

// A callback-style API of the kind this crate wraps
fn fetch_score(player: String, on_ok: Callback<u32>, on_err: Callback<std::io::Error>) {
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        match player.as_str() {
            "ghost" => on_err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no such player",
            )),
            _ => on_ok(player.len() as u32 * 10),
        }
    });
}

fn score_of(player: &str) -> AsyncTask<u32> {
    let player = player.to_string();
    from_callbacks(move |ok, err| fetch_score(player.clone(), ok, err))
}

// A simple computation function
async fn expensive_computation(x: u32) -> u32 {
    tokio::time::sleep(Duration::from_millis(100)).await;
    x * x
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🚀 Starting tasklink example");

    let squared = score_of("alice")
        .and_then(|score| {
            from_future(move || async move {
                Ok::<_, tasklink::Error>(expensive_computation(score).await)
            })
        })
        .map(|squared| format!("squared score: {squared}"))
        .named("alice");

    let handle = squared.run();
    println!("📤 Task started with ID: {}", handle.id());
    println!("✅ {}", handle.await?);

    // Same graph, started again: the score is fetched a second time
    println!("🔁 {}", squared.await?);

    println!("\n🔄 Running batch tasks...");
    let handles: Vec<_> = ["bob", "ghost", "carol"]
        .into_iter()
        .map(|player| score_of(player).run())
        .collect();

    let results = futures::future::join_all(handles).await;
    for (i, result) in results.into_iter().enumerate() {
        println!("Task {}: {:?}", i + 1, result);
    }

    Ok(())
}
