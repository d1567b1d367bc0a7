use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gatekeeper_core::{Action, PermissionPatch, PermissionRecord, PermissionTable, TemporaryGrant};
use gatekeeper_perms::Permissions;

fn permissions(grant_count: usize) -> Permissions {
    let now = Utc::now();
    let table: PermissionTable = (0..200)
        .map(|i| (format!("/resource/{}", i), PermissionRecord::new(true, false, false, i % 2 == 0)))
        .collect();
    let grants = (0..grant_count)
        .map(|i| {
            let expires = if i % 3 == 0 {
                now - Duration::minutes(1)
            } else {
                now + Duration::hours(1)
            };
            TemporaryGrant::new(format!("grant-{}", i), expires).with_path(
                format!("/resource/{}", i % 200),
                PermissionPatch::new().with(Action::Create, true),
            )
        })
        .collect();
    Permissions::new(Some(table), grants, now)
}

fn bench_checks(c: &mut Criterion) {
    let few = permissions(4);
    let many = permissions(500);

    c.bench_function("can_create/4 grants", |b| {
        b.iter(|| few.can_create(black_box("/resource/1")))
    });
    c.bench_function("can_create/500 grants", |b| {
        b.iter(|| many.can_create(black_box("/resource/1")))
    });
}

criterion_group!(benches, bench_checks);
criterion_main!(benches);
