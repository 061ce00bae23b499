use {super::*, std::hint::black_box};

#[derive(Debug, Parser)]
pub(crate) struct Bench {
    #[arg(default_value_t = 1_000_000, help = "Hash <ITERATIONS> headers.")]
    iterations: u64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Output {
    pub iterations: u64,
    pub seconds: f64,
    pub hash_rate: HashRate,
}

impl Bench {
    pub(crate) async fn run(self, cancel_token: CancellationToken) -> Result {
        let iterations = self.iterations;

        let output = task::spawn_blocking(move || measure(iterations, &cancel_token)).await?;

        println!("{}", serde_json::to_string_pretty(&output)?);

        Ok(())
    }
}

fn measure(iterations: u64, cancel: &CancellationToken) -> Output {
    let mut header = [0u8; 80];
    header[..4].copy_from_slice(&2u32.to_le_bytes());
    header[72..76].copy_from_slice(&0x1d00_ffffu32.to_le_bytes());

    let hasher = HeaderHasher::new(header);

    let start = Instant::now();
    let mut hashes = 0;

    while hashes < iterations {
        if hashes % 65_536 == 0 && cancel.is_cancelled() {
            break;
        }

        black_box(hasher.hash(hashes as u32));
        hashes += 1;
    }

    let elapsed = start.elapsed();

    Output {
        iterations: hashes,
        seconds: elapsed.as_secs_f64(),
        hash_rate: HashRate::from_hashes(hashes, elapsed),
    }
}
