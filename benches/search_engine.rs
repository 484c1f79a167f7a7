use std::hint::black_box;

use chat_vault_search::models::{AuthorRole, Conversation, Message};
use chat_vault_search::search::{Query, search};
use chrono::{TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

/// Generate synthetic normalised conversations
fn generate_conversations(count: usize) -> Vec<Conversation> {
    (0..count)
        .map(|c| Conversation {
            id: format!("conv-{}", c),
            title: if c % 10 == 0 { format!("Docker notes {}", c) } else { format!("Chat {}", c) },
            create_time: Utc.timestamp_opt(1_700_000_000 + c as i64, 0).single(),
            messages: (0..10)
                .map(|m| {
                    let text = if m % 4 == 0 {
                        format!("Try this:\n```bash\ndocker compose up -d service-{}\n```", m)
                    } else {
                        format!("Some longer prose about topic {} that will not match the query", m)
                    };
                    Message::new(
                        format!("c{}-m{}", c, m),
                        if m % 2 == 0 { AuthorRole::User } else { AuthorRole::Assistant },
                        Utc.timestamp_opt(1_700_000_000 + (c * 10 + m) as i64, 0).single(),
                        text,
                    )
                })
                .collect(),
        })
        .collect()
}

fn bench_search(c: &mut Criterion) {
    let queries = [
        ("literal", Query::builder("docker").build().unwrap()),
        ("regex", Query::builder(r"service-\d+").regex(true).build().unwrap()),
        ("only_with_code", Query::builder("compose").only_with_code(true).build().unwrap()),
    ];

    for (name, query) in &queries {
        let mut group = c.benchmark_group(format!("search_{}", name));
        for size in [1_000, 10_000].iter() {
            let conversations = generate_conversations(*size);
            group.throughput(Throughput::Elements(*size as u64));
            group.bench_with_input(BenchmarkId::from_parameter(size), &conversations, |b, convs| {
                b.iter(|| search(black_box(convs), black_box(query)).len());
            });
        }
        group.finish();
    }
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
