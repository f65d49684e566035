//! Built-in prompt bodies, one per mode and sub-step.

pub const ARTICLE: &str = "article";
pub const ARTICLE_QA: &str = "article_qa";
pub const ROUND_TABLE: &str = "round_table";
pub const DEEP_RESEARCH: &str = "deep_research";

pub const ARTICLE_BODY: &str = r#"Write an informative, engaging article on the topic "{{topic}}".
Use the following research paper titles for guidance:
{{paper_titles}}

Structure it like a blog post and explain the key research insights in plain English.
If no paper titles are listed, say that no matching research was found and keep the article general."#;

pub const ARTICLE_QA_BODY: &str = r#"Based on the article and these papers:
{{summaries}}

Answer the question: {{question}}"#;

pub const ROUND_TABLE_BODY: &str = r#"You are a {{role}} taking part in a round table discussion on "{{topic}}".
The discussion is based on these research papers:
{{paper_titles}}

Share your insights and concerns from a {{role}}'s point of view in 5-6 sentences."#;

pub const DEEP_RESEARCH_BODY: &str = r#"You are a highly skilled research assistant.
Answer the following question using ONLY the information in these papers:

{{summaries}}

Question: {{question}}

Give a structured, evidence-based answer and mention paper titles where appropriate.
If the papers do not cover the question, say so instead of guessing."#;

pub fn builtin() -> [(&'static str, &'static str); 4] {
    [
        (ARTICLE, ARTICLE_BODY),
        (ARTICLE_QA, ARTICLE_QA_BODY),
        (ROUND_TABLE, ROUND_TABLE_BODY),
        (DEEP_RESEARCH, DEEP_RESEARCH_BODY),
    ]
}
