//! Prompt construction for the assistant.

use scout_core::SearchResult;

const SEARCH_TRIGGERS: [&str; 10] = [
    "what", "when", "where", "who", "how", "why", "current", "latest", "recent", "update",
];

/// Cheap heuristic: does this message look like it wants fresh/factual information?
pub fn needs_web_search(message: &str) -> bool {
    let lower = message.to_lowercase();
    SEARCH_TRIGGERS.iter().any(|k| lower.contains(k))
}

pub fn plain_prompt(message: &str) -> String {
    format!("User: {message}\n\nAssistant:")
}

/// Numbered source blocks, in result order, so the model can cite `[n]`.
pub fn sources_block(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "Source {}: {}\nURL: {}\nContent: {}",
                i + 1,
                r.title,
                r.url,
                r.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn web_aware_prompt(query: &str, results: &[SearchResult]) -> String {
    format!(
        "You are a helpful AI assistant that can answer questions using web search results.\n\
         \n\
         User's question: {query}\n\
         \n\
         Here are some relevant search results:\n\
         {sources}\n\
         \n\
         Based on the above information, please provide a clear and concise answer to the user's question.\n\
         If the search results don't contain enough information to answer the question, please say so.\n\
         Include relevant source numbers (e.g., [1], [2]) to cite your information.\n\
         \n\
         Answer:",
        sources = sources_block(results)
    )
}

pub fn summarize_prompt(text: &str, max_sentences: usize) -> String {
    format!(
        "Please provide a concise summary of the following text in {max_sentences} sentences or less.\n\
         Focus on the key points and main ideas.\n\
         \n\
         Text to summarize:\n\
         {text}\n\
         \n\
         Summary:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(i: usize) -> SearchResult {
        SearchResult {
            title: format!("Title {i}"),
            snippet: format!("Snippet {i}"),
            url: format!("https://example.com/{i}"),
            score: None,
        }
    }

    #[test]
    fn trigger_words_are_case_insensitive() {
        assert!(needs_web_search("What is the capital of France?"));
        assert!(needs_web_search("LATEST rust release"));
        assert!(!needs_web_search("tell me a joke"));
    }

    #[test]
    fn sources_are_numbered_in_order() {
        let p = web_aware_prompt("q", &[result(0), result(1)]);
        let a = p.find("Source 1: Title 0").unwrap();
        let b = p.find("Source 2: Title 1").unwrap();
        assert!(a < b);
        assert!(p.contains("URL: https://example.com/1"));
        assert!(p.contains("User's question: q"));
        assert!(p.trim_end().ends_with("Answer:"));
    }

    #[test]
    fn summarize_prompt_mentions_sentence_budget() {
        let p = summarize_prompt("long text", 3);
        assert!(p.contains("3 sentences or less"));
        assert!(p.contains("long text"));
    }

    #[test]
    fn plain_prompt_shape() {
        assert_eq!(plain_prompt("hi"), "User: hi\n\nAssistant:");
    }
}
