use chrono::{Duration, NaiveDate};

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

    fn next_range(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let categories = [
        "bed_bath_table",
        "health_beauty",
        "sports_leisure",
        "furniture_decor",
        "computers_accessories",
        "housewares",
        "watches_gifts",
        "telephony",
        "toys",
        "garden_tools",
    ];

    // A handful of products per category, with popularity skewed so that
    // top/least rankings have visible spread.
    let mut products: Vec<(String, &str, f64)> = Vec::new();
    for (ci, category) in categories.iter().enumerate() {
        for pi in 0..6 {
            let popularity = 1.0 / (1.0 + (ci * 6 + pi) as f64 * 0.35);
            products.push((format!("prod_{ci:02}{pi}"), category, popularity));
        }
    }
    let popularity_total: f64 = products.iter().map(|p| p.2).sum();

    // Customers with a few heavy buyers so the heatmap's top 20 stand out.
    let customers: Vec<String> = (0..120).map(|i| format!("cust_{i:04}")).collect();

    let start = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap();
    let span_days = 700;

    let output_path = "sample_orders.csv";
    let mut writer = csv::Writer::from_path(output_path).expect("Failed to create output file");
    writer
        .write_record([
            "product_id",
            "product_category_name_english",
            "order_item_id",
            "customer_unique_id",
            "order_purchase_timestamp",
        ])
        .expect("Failed to write header");

    let n_rows = 5000;
    for _ in 0..n_rows {
        // Popularity-weighted product pick.
        let mut target = rng.next_f64() * popularity_total;
        let mut pick = 0;
        for (i, p) in products.iter().enumerate() {
            target -= p.2;
            if target <= 0.0 {
                pick = i;
                break;
            }
        }
        let (product_id, category, _) = &products[pick];

        // Heavy buyers occupy the low customer indices.
        let customer = if rng.next_f64() < 0.4 {
            &customers[rng.next_range(15)]
        } else {
            &customers[rng.next_range(customers.len())]
        };

        let day = rng.next_range(span_days) as i64;
        let second = rng.next_range(86400) as i64;
        let ts = start.and_hms_opt(0, 0, 0).unwrap() + Duration::days(day) + Duration::seconds(second);

        let order_item_id = 1 + rng.next_range(3);
        writer
            .write_record([
                product_id.as_str(),
                category,
                &order_item_id.to_string(),
                customer.as_str(),
                &ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            ])
            .expect("Failed to write row");
    }

    writer.flush().expect("Failed to flush output");
    println!(
        "Wrote {n_rows} orders across {} products to {output_path}",
        products.len()
    );
}
