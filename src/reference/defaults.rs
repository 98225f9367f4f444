use crate::model::{Addon, Package, Theme, TransactionCategory, TransactionKind, WorkStatus};

pub fn work_statuses() -> Vec<WorkStatus> {
    [
        ("status-antrian", "Antrian", "#94a3b8"),
        ("status-proses", "Proses", "#3b82f6"),
        ("status-revisi", "Revisi", "#f59e0b"),
        ("status-selesai", "Selesai", "#22c55e"),
    ]
    .iter()
    .enumerate()
    .map(|(i, (id, name, color))| WorkStatus {
        id: id.to_string(),
        code: format!("WS{:03}", i + 1),
        name: name.to_string(),
        color: color.to_string(),
        order: i as u32 + 1,
        ..WorkStatus::default()
    })
    .collect()
}

pub fn packages() -> Vec<Package> {
    [
        ("pkg-basic", "Basic", 99_000i64, "Satu halaman, galeri 5 foto"),
        ("pkg-premium", "Premium", 199_000, "RSVP, galeri 20 foto, musik"),
        ("pkg-exclusive", "Exclusive", 349_000, "Domain khusus, galeri tanpa batas"),
    ]
    .iter()
    .map(|(id, name, price, description)| Package {
        id: id.to_string(),
        name: name.to_string(),
        price: (*price).into(),
        description: Some(description.to_string()),
        ..Package::default()
    })
    .collect()
}

pub fn themes() -> Vec<Theme> {
    [
        ("theme-elegant", "Elegant"),
        ("theme-rustic", "Rustic"),
        ("theme-floral", "Floral"),
        ("theme-minimalis", "Minimalis"),
    ]
    .iter()
    .map(|(id, name)| Theme {
        id: id.to_string(),
        name: name.to_string(),
        ..Theme::default()
    })
    .collect()
}

pub fn addons() -> Vec<Addon> {
    [
        ("addon-domain", "Custom Domain", 50_000i64, "#3b82f6"),
        ("addon-music", "Musik Latar", 25_000, "#8b5cf6"),
        ("addon-gallery", "Galeri Foto Tambahan", 30_000, "#ec4899"),
    ]
    .iter()
    .enumerate()
    .map(|(i, (id, name, price, color))| Addon {
        id: id.to_string(),
        code: format!("A{:03}", i + 1),
        name: name.to_string(),
        price: (*price).into(),
        color: color.to_string(),
        ..Addon::default()
    })
    .collect()
}

pub fn transaction_categories() -> Vec<TransactionCategory> {
    [
        ("cat-order", "Pembayaran Order", TransactionKind::Income),
        ("cat-income-other", "Lainnya", TransactionKind::Income),
        ("cat-ops", "Operasional", TransactionKind::Expense),
        ("cat-ads", "Iklan", TransactionKind::Expense),
        ("cat-salary", "Gaji", TransactionKind::Expense),
        ("cat-expense-other", "Lainnya", TransactionKind::Expense),
    ]
    .iter()
    .map(|(id, name, kind)| TransactionCategory {
        id: id.to_string(),
        name: name.to_string(),
        kind: *kind,
        ..TransactionCategory::default()
    })
    .collect()
}
