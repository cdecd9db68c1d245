use anyhow::{Context, Result};
use rusqlite::Connection;

use imdb_dashboard::config::DEFAULT_TABLE;
use imdb_dashboard::data::import::write_movies;
use imdb_dashboard::data::model::{columns, CellValue, Table};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo + 1)
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.next_u64() as usize % items.len()]
    }
}

/// Duration text in the scraped formats: `"2h 5m"`, `"2h"`, `"45m"`.
fn duration_text(minutes: u64) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

/// Vote count text as IMDB lists show it: `"870"`, `"12K"`, `"1.2M"`.
fn votes_text(votes: u64) -> String {
    if votes >= 1_000_000 {
        format!("{:.1}M", votes as f64 / 1_000_000.0)
    } else if votes >= 1_000 {
        format!("{}K", votes / 1_000)
    } else {
        votes.to_string()
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let genres = ["Action", "Animation", "Comedy", "Drama", "Horror", "Sci-Fi", "Thriller"];
    let adjectives = ["Silent", "Last", "Crimson", "Hidden", "Broken", "Golden", "Midnight", "Lost"];
    let nouns = ["Harbor", "Signal", "Empire", "Garden", "Frontier", "Echo", "Machine", "Road"];

    let mut table = Table::new(columns::ALL.iter().map(|c| c.to_string()).collect());

    for i in 0..240 {
        let genre = rng.pick(&genres);
        let name = format!("The {} {} {}", rng.pick(&adjectives), rng.pick(&nouns), i + 1);

        // Animation skews short, Drama long; a few rows carry junk durations.
        let minutes = match genre {
            "Animation" => rng.range(20, 110),
            "Drama" => rng.range(85, 200),
            _ => rng.range(75, 170),
        };
        let duration = if rng.next_f64() < 0.03 {
            CellValue::Text("TBA".to_string())
        } else {
            CellValue::Text(duration_text(minutes))
        };

        let popularity = rng.next_f64().powi(3);
        let votes = (popularity * 2_500_000.0) as u64 + rng.range(10, 900);
        let rating = if rng.next_f64() < 0.05 {
            CellValue::Null
        } else {
            CellValue::Float(((3.0 + rng.next_f64() * 5.5 + popularity * 1.2) * 10.0).round() / 10.0)
        };

        table.rows.push(vec![
            CellValue::Text(name),
            CellValue::Text(genre.to_string()),
            duration,
            CellValue::Text(votes_text(votes)),
            rating,
        ]);
    }

    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "imdbmovielist2024.db".to_string());
    let mut conn = Connection::open(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    let n = write_movies(&mut conn, DEFAULT_TABLE, &table)?;

    println!("Wrote {n} movies to {output_path} (table {DEFAULT_TABLE})");
    Ok(())
}
