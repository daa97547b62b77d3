//! Seeded synthetic cohorts.
//!
//! Produces student and mentor tables in the same shape the CSV readers
//! accept: Dutch headers, list cells written as `['Mon', 'Tue']`. The same
//! seed always yields the same cohort.
//!
//! Students are drawn from the lower education labels and mentors from
//! the upper ones, so most pairs pass the education rule and subject/day
//! overlap decides eligibility.

use itertools::Itertools;
use rand::rngs::SmallRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::ingest::{Cell, MentorRecord, StudentRecord};

/// Subjects used when none are configured.
pub const DEFAULT_SUBJECTS: [&str; 10] = [
    "Creative Digital Innovation",
    "Design Science Research",
    "Cyber Security",
    "Software Architecture",
    "Ethical Hacking",
    "Artificial Intelligence",
    "Data Science",
    "Business Process Analytics",
    "Data Visualisation",
    "Business Change and Innovation",
];

/// Weekdays used when none are configured.
pub const WEEKDAYS: [&str; 5] = ["Mon", "Tue", "Wed", "Thu", "Fri"];

const STUDENT_LEVELS: [&str; 2] = ["Associate", "Bachelor"];
const MENTOR_LEVELS: [&str; 2] = ["Master", "PhD"];

const FIRST_NAMES: [&str; 12] = [
    "Anna", "Bram", "Daan", "Eva", "Fleur", "Jesse", "Lotte", "Milan", "Noah", "Sara", "Tess",
    "Yara",
];
const LAST_NAMES: [&str; 10] = [
    "Bakker", "de Boer", "Dekker", "Jansen", "de Jong", "Mulder", "Smit", "Visser", "de Vries",
    "van Dijk",
];

const STUDENTS_HEADER: [&str; 6] = [
    "Voornaam",
    "Achternaam",
    "Opleidingsniveau",
    "Onderwerp",
    "Beschikbaarheid",
    "omschrijving",
];
const MENTORS_HEADER: [&str; 6] = [
    "Voornaam",
    "Achternaam",
    "Opleidingsniveau",
    "Onderwerpen",
    "Beschikbaarheid",
    "Max_Studenten",
];

/// Generated tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cohort {
    /// Student rows.
    pub students: Vec<StudentRecord>,
    /// Type1 mentor rows.
    pub mentors_type1: Vec<MentorRecord>,
    /// Type2 mentor rows.
    pub mentors_type2: Vec<MentorRecord>,
}

/// Paths written by [`Cohort::write_csv`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CohortFiles {
    /// `students.csv`.
    pub students: PathBuf,
    /// `mentors_type1.csv`.
    pub mentors_type1: PathBuf,
    /// `mentors_type2.csv`.
    pub mentors_type2: PathBuf,
}

impl Cohort {
    /// Writes the three tables into `dir`, creating it if needed.
    ///
    /// Empty tables still get their header row.
    pub fn write_csv(&self, dir: impl AsRef<Path>) -> Result<CohortFiles> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let files = CohortFiles {
            students: dir.join("students.csv"),
            mentors_type1: dir.join("mentors_type1.csv"),
            mentors_type2: dir.join("mentors_type2.csv"),
        };
        write_table(&files.students, &self.students, &STUDENTS_HEADER)?;
        write_table(&files.mentors_type1, &self.mentors_type1, &MENTORS_HEADER)?;
        write_table(&files.mentors_type2, &self.mentors_type2, &MENTORS_HEADER)?;

        tracing::info!(
            dir = %dir.display(),
            students = self.students.len(),
            mentors_type1 = self.mentors_type1.len(),
            mentors_type2 = self.mentors_type2.len(),
            "wrote synthetic cohort"
        );
        Ok(files)
    }
}

fn write_table<T: Serialize>(path: &Path, rows: &[T], header: &[&str]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        writer.write_record(header)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn list_literal<'a>(items: impl IntoIterator<Item = &'a str>) -> Cell {
    Cell::Text(format!("[{}]", items.into_iter().map(|s| format!("'{s}'")).join(", ")))
}

/// Seeded cohort generator.
///
/// # Example
/// ```
/// use u_match::generator::CohortGenerator;
///
/// let cohort = CohortGenerator::new(42).with_students(10).with_mentors(6).generate();
/// assert_eq!(cohort.students.len(), 10);
/// assert_eq!(cohort.mentors_type1.len(), 6);
/// assert!(cohort.mentors_type2.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct CohortGenerator {
    seed: u64,
    students: usize,
    mentors_type1: usize,
    mentors_type2: usize,
    subjects: Vec<String>,
    days: Vec<String>,
    max_capacity: i64,
}

impl CohortGenerator {
    /// Creates a generator: 50 students, 30 type1 mentors, no type2 mentors.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            students: 50,
            mentors_type1: 30,
            mentors_type2: 0,
            subjects: DEFAULT_SUBJECTS.iter().map(|s| s.to_string()).collect(),
            days: WEEKDAYS.iter().map(|s| s.to_string()).collect(),
            max_capacity: 3,
        }
    }

    /// Sets the number of students.
    pub fn with_students(mut self, n: usize) -> Self {
        self.students = n;
        self
    }

    /// Sets the number of type1 mentors.
    pub fn with_mentors(mut self, n: usize) -> Self {
        self.mentors_type1 = n;
        self
    }

    /// Sets the number of type2 mentors.
    pub fn with_type2_mentors(mut self, n: usize) -> Self {
        self.mentors_type2 = n;
        self
    }

    /// Replaces the subject pool. Ignored when empty.
    pub fn with_subjects<I, S>(mut self, subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let subjects: Vec<String> = subjects.into_iter().map(Into::into).collect();
        if !subjects.is_empty() {
            self.subjects = subjects;
        }
        self
    }

    /// Replaces the day pool. Ignored when empty.
    pub fn with_days<I, S>(mut self, days: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let days: Vec<String> = days.into_iter().map(Into::into).collect();
        if !days.is_empty() {
            self.days = days;
        }
        self
    }

    /// Sets the upper bound of mentor capacities (at least 1).
    pub fn with_max_capacity(mut self, max: i64) -> Self {
        self.max_capacity = max.max(1);
        self
    }

    /// Generates the cohort.
    pub fn generate(&self) -> Cohort {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let students = (0..self.students).map(|_| self.student(&mut rng)).collect();
        let mentors_type1 = (0..self.mentors_type1).map(|_| self.mentor(&mut rng)).collect();
        let mentors_type2 = (0..self.mentors_type2).map(|_| self.mentor(&mut rng)).collect();
        Cohort {
            students,
            mentors_type1,
            mentors_type2,
        }
    }

    fn pick<'a, R: Rng>(pool: &'a [&'a str], rng: &mut R) -> &'a str {
        pool.choose(rng).copied().unwrap_or_default()
    }

    /// `lo..=hi` distinct items of `pool`, kept in pool order.
    fn sample<'a, R: Rng>(pool: &'a [String], lo: usize, hi: usize, rng: &mut R) -> Vec<&'a str> {
        let hi = hi.min(pool.len());
        let lo = lo.min(hi);
        let count = rng.random_range(lo..=hi);
        let mut indices: Vec<usize> = (0..pool.len()).collect();
        indices.shuffle(rng);
        indices.truncate(count);
        indices.sort_unstable();
        indices.into_iter().map(|i| pool[i].as_str()).collect()
    }

    fn student<R: Rng>(&self, rng: &mut R) -> StudentRecord {
        let subject = self
            .subjects
            .choose(rng)
            .cloned()
            .unwrap_or_default();
        StudentRecord::new(
            Self::pick(&FIRST_NAMES, rng),
            Self::pick(&LAST_NAMES, rng),
            Self::pick(&STUDENT_LEVELS, rng),
            subject,
            list_literal(Self::sample(&self.days, 1, 3, rng)),
        )
    }

    fn mentor<R: Rng>(&self, rng: &mut R) -> MentorRecord {
        MentorRecord::new(
            Self::pick(&FIRST_NAMES, rng),
            Self::pick(&LAST_NAMES, rng),
            Self::pick(&MENTOR_LEVELS, rng),
            list_literal(Self::sample(&self.subjects, 1, 3, rng)),
            list_literal(Self::sample(&self.days, 2, 4, rng)),
            rng.random_range(1..=self.max_capacity),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EducationMapping;
    use crate::ingest::{read_mentors_file, read_students_file, EntityBuilder, MENTORS_TYPE1_TABLE};

    #[test]
    fn test_same_seed_same_cohort() {
        let a = CohortGenerator::new(3).with_type2_mentors(4).generate();
        let b = CohortGenerator::new(3).with_type2_mentors(4).generate();
        assert_eq!(a, b);
        assert_eq!(a.students.len(), 50);
        assert_eq!(a.mentors_type1.len(), 30);
        assert_eq!(a.mentors_type2.len(), 4);
    }

    #[test]
    fn test_records_build_into_entities() {
        let cohort = CohortGenerator::new(11)
            .with_students(25)
            .with_mentors(12)
            .with_type2_mentors(5)
            .with_max_capacity(4)
            .generate();
        let mapping = EducationMapping::default();
        let entities = EntityBuilder::new(&mapping)
            .build(
                &cohort.students,
                &cohort.mentors_type1,
                Some(cohort.mentors_type2.as_slice()),
            )
            .unwrap();

        assert_eq!(entities.students.len(), 25);
        assert_eq!(entities.mentors.len(), 17);
        for s in &entities.students {
            assert!((1..=3).contains(&s.availability.len()));
            assert!(s.education_level <= 2);
        }
        for m in &entities.mentors {
            assert!((1..=3).contains(&m.subjects.len()));
            assert!((2..=4).contains(&m.availability.len()));
            assert!((1..=4).contains(&m.max_students));
            assert!(m.education_level >= 3);
        }
    }

    #[test]
    fn test_custom_pools() {
        let cohort = CohortGenerator::new(5)
            .with_students(8)
            .with_subjects(["ai"])
            .with_days(["Mon", "Tue"])
            .generate();
        for s in &cohort.students {
            assert_eq!(s.subject, "ai");
            let days = s.availability.items().unwrap();
            assert!(days.iter().all(|d| d == "Mon" || d == "Tue"));
        }
    }

    #[test]
    fn test_write_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cohort = CohortGenerator::new(9).with_students(6).with_mentors(4).generate();
        let files = cohort.write_csv(dir.path().join("data")).unwrap();

        let students = read_students_file(&files.students).unwrap();
        assert_eq!(students.len(), 6);
        assert_eq!(students[0].first_name, cohort.students[0].first_name);
        assert_eq!(students[0].availability.items(), cohort.students[0].availability.items());

        let mentors = read_mentors_file(&files.mentors_type1, MENTORS_TYPE1_TABLE).unwrap();
        assert_eq!(mentors.len(), 4);
        assert_eq!(mentors[0].max_students, cohort.mentors_type1[0].max_students);

        // header-only table
        assert!(files.mentors_type2.exists());
    }
}
