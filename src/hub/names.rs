use rand::seq::IndexedRandom;

const FIRST_NAMES: &[&str] = &[
    "Olena", "Taras", "Iryna", "Mykola", "Sofia", "Andrii", "Maria", "Dmytro", "Kateryna",
    "Petro", "Anna", "Oleh", "Yulia", "Bohdan", "Natalia", "Ivan", "Oksana", "Serhii",
    "James", "Linda", "Robert", "Patricia", "Michael", "Barbara", "David", "Susan",
];

const LAST_NAMES: &[&str] = &[
    "Shevchenko", "Kovalenko", "Bondarenko", "Tkachenko", "Kravchenko", "Melnyk", "Boyko",
    "Oliynyk", "Lysenko", "Marchenko", "Savchenko", "Rudenko", "Smith", "Johnson",
    "Williams", "Brown", "Jones", "Miller", "Davis", "Wilson", "Taylor", "Clark",
];

/// Produces the display name assigned to a connection when it registers.
pub trait NameGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random "First Last" names. Names may repeat across connections.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomNameGenerator;

impl NameGenerator for RandomNameGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::rng();
        let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Anonymous");
        let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("User");
        format!("{first} {last}")
    }
}
