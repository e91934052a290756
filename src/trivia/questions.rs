use std::fs;
use std::ops::Index;
use std::path::Path;

use rand::Rng;

use crate::error::TriviaError;
use crate::trivia::{normalize::normalize, Question};

/// Separates the prompt from its answers, and the answers from each other.
pub const FIELD_DELIMITER: char = '`';

#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
    invalid: usize,
}

impl QuestionBank {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TriviaError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| TriviaError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let bank = Self::parse(&contents);
        log::info!(
            "Loaded {} questions from {} ({} invalid)",
            bank.valid_count(),
            path.display(),
            bank.invalid_count()
        );
        Ok(bank)
    }

    pub fn parse(contents: &str) -> Self {
        let mut bank = Self::default();

        for line in contents.lines() {
            match parse_line(line) {
                Some(question) => bank.questions.push(question),
                None => {
                    log::warn!("Invalid question ({})", line);
                    bank.invalid += 1;
                }
            }
        }

        bank
    }

    pub fn valid_count(&self) -> usize {
        self.questions.len()
    }

    pub fn invalid_count(&self) -> usize {
        self.invalid
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Uniform over every valid question. Panics on an empty bank, which
    /// `RoundEngine::new` refuses before any round can start.
    pub fn pick_random(&self) -> usize {
        rand::thread_rng().gen_range(0..self.questions.len())
    }
}

impl Index<usize> for QuestionBank {
    type Output = Question;

    fn index(&self, index: usize) -> &Question {
        &self.questions[index]
    }
}

fn parse_line(line: &str) -> Option<Question> {
    let mut fields = line.split(FIELD_DELIMITER);
    let prompt = fields.next()?.trim().to_string();
    let answers = fields
        .map(str::trim)
        .filter(|answer| !normalize(answer).is_empty())
        .map(str::to_string)
        .collect();
    Question::new(prompt, answers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::io::Write;

    #[test]
    fn parses_prompt_and_answers() {
        let bank = QuestionBank::parse("Capital of France?` Paris\n");
        assert_eq!(bank.valid_count(), 1);
        assert_eq!(bank.invalid_count(), 0);

        let q = &bank[0];
        assert_eq!(q.prompt, "Capital of France?");
        assert_eq!(q.answers, vec!["Paris".to_string()]);
    }

    #[test]
    fn keeps_every_answer_in_order() {
        let bank = QuestionBank::parse("Largest planet?`Jupiter`Jove");
        let q = &bank[0];
        assert_eq!(q.answers, vec!["Jupiter".to_string(), "Jove".to_string()]);
    }

    #[test]
    fn lines_without_answers_are_counted_and_skipped() {
        let contents = "Good?`yes\nno delimiter here\n\nEmpty answer?`  \nAlso good?`sure";
        let bank = QuestionBank::parse(contents);
        assert_eq!(bank.valid_count(), 2);
        assert_eq!(bank.invalid_count(), 3);
        assert_eq!(bank[1].prompt, "Also good?");
    }

    #[test]
    fn symbol_only_answers_are_dropped() {
        let bank = QuestionBank::parse("Symbol for 'and'?`&\nPlus sign?`+`plus\nEllipsis?`...");
        assert_eq!(bank.valid_count(), 1);
        assert_eq!(bank.invalid_count(), 2);
        assert_eq!(bank[0].answers, vec!["plus".to_string()]);
        assert!(bank[0].is_correct("PLUS"));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "2 + 2?`4`four").unwrap();
        writeln!(file, "broken").unwrap();

        let bank = QuestionBank::load(file.path()).unwrap();
        assert_eq!(bank.valid_count(), 1);
        assert_eq!(bank.invalid_count(), 1);
    }

    #[test]
    fn load_missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = QuestionBank::load(dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, TriviaError::Io { .. }));
    }

    // The selector used to draw from [0, len - 1), which never picked the
    // last question.
    #[test]
    fn pick_random_reaches_the_last_question() {
        let bank = QuestionBank::parse("a?`1\nb?`2\nc?`3");
        let picked: HashSet<usize> = (0..500).map(|_| bank.pick_random()).collect();
        assert_eq!(picked, HashSet::from([0, 1, 2]));
    }

    #[test]
    fn pick_random_on_single_question_bank() {
        let bank = QuestionBank::parse("only?`one");
        assert_eq!(bank.pick_random(), 0);
    }

    proptest! {
        #[test]
        fn counts_cover_every_line(lines in prop::collection::vec("[a-z `?]{0,12}", 0..20)) {
            let contents = lines.join("\n");
            let bank = QuestionBank::parse(&contents);
            prop_assert_eq!(bank.valid_count() + bank.invalid_count(), contents.lines().count());
            for i in 0..bank.valid_count() {
                prop_assert!(!bank[i].answers.is_empty());
            }
        }
    }
}
