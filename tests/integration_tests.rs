mod integration_tests_helper {

    use std::path::Path;

    use finaut::dfa::Dfa;
    use finaut::{canonicalize, construct_dfa, read_nfa};

    // Determinizes the NFA description at the given path and relabels the
    // result with sequential numeric state names.
    pub fn determinized(nfa_path: &str) -> Dfa {
        let nfa = read_nfa(Path::new(nfa_path));

        // assert that reading the file was successful
        assert!(nfa.is_ok());

        let nfa = nfa.unwrap();

        let subset_dfa = construct_dfa(&nfa);
        canonicalize(&subset_dfa)
    }
}

mod integration_tests {
    use crate::integration_tests_helper::determinized;

    use std::fs;
    use std::path::Path;

    use finaut::fa::Fa;
    use finaut::{
        construct_minimal_dfa, read_dfa, read_words, save_dot, simulate, write_dfa, write_verdicts,
    };

    #[test]
    fn test_convert_write_and_simulate() {
        let dfa = determinized("test_data/sample.nfa");

        // {q0}, {q0,q1} and {q0,q2}, relabelled 0, 1 and 2.
        assert_eq!(dfa.get_num_states(), 3);
        assert_eq!(dfa.get_state_label(0), "0");
        assert_eq!(dfa.get_state_label(2), "2");
        assert_eq!(dfa.get_acceptor_states().count_ones(), 1);

        let dir = tempfile::tempdir().unwrap();
        let dfa_path = dir.path().join("sample.dfa");
        write_dfa(&dfa, &dfa_path).unwrap();

        let reread = read_dfa(&dfa_path).unwrap();
        assert_eq!(reread.get_num_states(), 3);

        let words = read_words(Path::new("test_data/words.txt")).unwrap();
        assert_eq!(words.len(), 7);

        let verdicts = simulate(&reread, &words);
        let verdicts_path = dir.path().join("verdicts.txt");
        write_verdicts(&verdicts, &verdicts_path).unwrap();

        // The language is "words ending in 01"; '_' truncates a word.
        let expected = "\
01 aceita
0101 aceita
10 rejeita
1 rejeita
_01 rejeita
0_1 rejeita
001_ aceita
";
        assert_eq!(fs::read_to_string(&verdicts_path).unwrap(), expected);
    }

    #[test]
    fn test_minimize_description_file() {
        let dfa = read_dfa(Path::new("test_data/redundant.dfa")).unwrap();
        assert_eq!(dfa.get_num_states(), 4);

        let minimal = construct_minimal_dfa(&dfa);
        assert_eq!(minimal.get_num_states(), 2);
        assert!(minimal.state_id("s0s2").is_some());
        assert!(minimal.state_id("s1s3").is_some());

        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("minimal.dfa");
        write_dfa(&minimal, &out_path).unwrap();

        let reread = read_dfa(&out_path).unwrap();
        assert_eq!(reread.get_num_states(), 2);
    }

    #[test]
    fn test_minimization_preserves_the_language() {
        let dfa = read_dfa(Path::new("test_data/redundant.dfa")).unwrap();
        let minimal = construct_minimal_dfa(&dfa);

        let words: Vec<String> = ["", "a", "b", "ab", "ba", "aab", "bab", "abab", "bbba"]
            .iter()
            .map(|w| w.to_string())
            .collect();

        let before = simulate(&dfa, &words);
        let after = simulate(&minimal, &words);

        for (old, new) in before.iter().zip(after.iter()) {
            assert_eq!(old.is_accepted(), new.is_accepted(), "word {:?}", old.get_word());
        }
    }

    #[test]
    fn test_dot_export_of_converted_dfa() {
        let dfa = determinized("test_data/sample.nfa");

        let dir = tempfile::tempdir().unwrap();
        let dot_path = dir.path().join("sample.dot");
        save_dot(&dfa, &dot_path).unwrap();

        let dot = fs::read_to_string(&dot_path).unwrap();
        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("(start)"));
        assert!(dot.contains("(accept)"));
    }
}
