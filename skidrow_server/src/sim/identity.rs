//! Cosmetic identities for hostiles.

use rand::{seq::SliceRandom, Rng};
use skidrow_shared::model::{Gender, Identity};

const FIRST_NAMES_MALE: &[&str] = &[
    "Thomas", "James", "Robert", "Michael", "William", "David", "Richard", "Joseph", "Charles",
    "Daniel", "Matthew", "Anthony", "Mark", "Donald", "Steven", "Paul", "Andrew", "Joshua",
    "Kenneth", "Kevin", "Brian", "George", "Timothy", "Ronald", "Edward", "Jason", "Jeffrey",
    "Ryan", "Jacob", "Gary", "Nicholas", "Eric", "Jonathan", "Stephen", "Larry", "Justin",
    "Scott", "Brandon", "Benjamin", "Samuel", "Raymond", "Gregory", "Frank", "Alexander",
    "Patrick", "Jack", "Dennis", "Jerry", "Tyler", "Aaron", "Jose", "Adam", "Nathan", "Henry",
    "Douglas", "Zachary", "Peter", "Kyle", "Noah", "Ethan",
];

const FIRST_NAMES_FEMALE: &[&str] = &[
    "Mary", "Patricia", "Jennifer", "Linda", "Barbara", "Elizabeth", "Susan", "Jessica", "Sarah",
    "Karen", "Lisa", "Nancy", "Betty", "Margaret", "Sandra", "Ashley", "Kimberly", "Emily",
    "Donna", "Michelle", "Dorothy", "Carol", "Amanda", "Melissa", "Deborah", "Stephanie",
    "Rebecca", "Sharon", "Laura", "Cynthia", "Kathleen", "Amy", "Angela", "Shirley", "Anna",
    "Brenda", "Pamela", "Emma", "Nicole", "Helen", "Samantha", "Katherine", "Christine", "Debra",
    "Rachel", "Carolyn", "Janet", "Catherine", "Maria", "Heather", "Diane", "Ruth", "Julie",
    "Olivia", "Joyce", "Virginia", "Victoria", "Kelly", "Lauren", "Christina",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson", "Walker", "Young", "Allen", "King", "Wright",
    "Scott", "Torres", "Nguyen", "Hill", "Flores", "Green", "Adams", "Nelson", "Baker", "Hall",
    "Rivera", "Campbell", "Mitchell", "Carter", "Roberts", "Gomez", "Phillips", "Evans",
    "Turner", "Diaz", "Parker", "Cruz", "Edwards", "Collins", "Reyes", "Stewart", "Morris",
    "Morales", "Murphy", "Cook", "Rogers", "Gutierrez", "Ortiz", "Morgan", "Cooper", "Peterson",
    "Bailey", "Reed", "Kelly", "Howard", "Ramos", "Kim", "Cox", "Ward", "Richardson",
];

pub const MIN_AGE: u32 = 18;
pub const MAX_AGE: u32 = 72;
pub const MAX_NET_WORTH: f32 = 10.0;

/// Rolls a name, gender, age in `18..=72` and a net worth in `[0, 10)`.
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Identity {
    let gender = if rng.gen_bool(0.5) {
        Gender::Male
    } else {
        Gender::Female
    };
    let pool = match gender {
        Gender::Male => FIRST_NAMES_MALE,
        Gender::Female => FIRST_NAMES_FEMALE,
    };
    let first = pool.choose(rng).copied().unwrap_or("John");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Doe");
    let age = rng.gen_range(MIN_AGE..=MAX_AGE);
    let net_worth = (rng.gen_range(0.0..MAX_NET_WORTH) * 100.0).round() / 100.0;

    Identity {
        first_name: first.to_string(),
        last_name: last.to_string(),
        full_name: format!("{first} {last}"),
        gender,
        age,
        net_worth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn identities_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let id = generate(&mut rng);
            assert!((MIN_AGE..=MAX_AGE).contains(&id.age));
            assert!((0.0..=MAX_NET_WORTH).contains(&id.net_worth));
            assert_eq!(id.full_name, format!("{} {}", id.first_name, id.last_name));
            let pool = match id.gender {
                Gender::Male => FIRST_NAMES_MALE,
                Gender::Female => FIRST_NAMES_FEMALE,
            };
            assert!(pool.contains(&id.first_name.as_str()));
        }
    }

    #[test]
    fn same_seed_same_identity() {
        let a = generate(&mut StdRng::seed_from_u64(3));
        let b = generate(&mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
