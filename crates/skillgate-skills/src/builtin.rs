//! Skills compiled into the gateway
//!
//! Registration order matters: it breaks ties between equal priorities.

use skillgate_types::{Skill, Tool};

const GENERAL_ASSISTANT_PROMPT: &str = r#"## General Assistant

You are a helpful, harmless, and honest AI assistant. You can:

- Answer questions on a wide range of topics
- Provide explanations and clarifications
- Help with problem-solving and decision-making
- Engage in thoughtful conversation
- Admit when you don't know something

**Guidelines:**
- Be concise and clear in your responses
- Ask clarifying questions when needed
- Provide accurate information to the best of your knowledge
- Be respectful and professional"#;

const DATA_ANALYSIS_PROMPT: &str = r#"## Data Analysis

You have access to Python code execution for data analysis tasks. You can:

- **Data Processing**: Use pandas and numpy for data manipulation and cleaning
- **Statistical Analysis**: Calculate statistics and perform hypothesis testing
- **Data Visualization**: Create charts and graphs using matplotlib and seaborn
- **Machine Learning**: Basic ML tasks with scikit-learn
- **File Processing**: Read CSV, Excel, JSON and other data formats

**Available Libraries:**
- pandas, numpy, scipy
- matplotlib, seaborn
- scikit-learn

**Working Style:**
- Show your code before executing it
- Explain what the code does and interpret the results
- Handle errors gracefully
- Suggest next steps or additional analyses"#;

const WEB_DEV_PROMPT: &str = r#"## Web Development

You are an expert web developer specializing in modern web technologies. You can help with:

**Frontend Development:**
- React components, hooks and state management
- Server-rendered frameworks and routing
- TypeScript type safety, interfaces and generics
- CSS and responsive design
- HTML and accessibility

**Backend Development:**
- REST API design and middleware
- Authentication and authorization
- Database integration (SQL, NoSQL)

**When Helping with Code:**
- Provide complete, working code examples
- Explain architectural decisions
- Consider security implications
- Suggest improvements and optimizations"#;

const SKILL_AUTHORING_PROMPT: &str = r#"## Skill Authoring

You help users create skills: modular packages that give an agent specialized
knowledge, workflows and tools.

**Skill Structure:**
- `SKILL.md` (required): YAML frontmatter with `name` and `description`, followed by
  Markdown instructions. The description says when the skill should be used.
- `scripts/`: executable code for deterministic, repeated tasks
- `references/`: documentation loaded as needed (schemas, APIs, policies)
- `assets/`: files used in output (templates, images, boilerplate)

**Creating a Skill:**
1. Ask for concrete examples of how the skill will be used
2. Identify which scripts, references and assets would help
3. Write SKILL.md in imperative form and keep it lean
4. Move detailed material into references/
5. Package, test on real tasks and iterate"#;

/// Every built-in skill in registration order
pub fn all() -> Vec<Skill> {
    vec![
        general_assistant(),
        data_analysis(),
        web_dev(),
        skill_authoring(),
    ]
}

/// General conversation, always first
pub fn general_assistant() -> Skill {
    Skill::new(
        "general-assistant",
        "General Assistant",
        "General conversational AI capabilities for answering questions and helping with various tasks",
        GENERAL_ASSISTANT_PROMPT,
    )
    .with_priority(10)
}

/// Python analysis through the provider's code execution sandbox
pub fn data_analysis() -> Skill {
    Skill::new(
        "data-analysis",
        "Data Analysis",
        "Python-based data analysis, visualization, and statistical computing",
        DATA_ANALYSIS_PROMPT,
    )
    .with_priority(8)
    .with_tool(Tool::code_execution())
}

/// Web development guidance
pub fn web_dev() -> Skill {
    Skill::new(
        "web-dev",
        "Web Development",
        "Expert guidance on web development with React, TypeScript, and modern web technologies",
        WEB_DEV_PROMPT,
    )
    .with_priority(7)
}

/// Guidance for writing SKILL.md bundles
pub fn skill_authoring() -> Skill {
    Skill::new(
        "skill-authoring",
        "Skill Authoring",
        "Helps users plan, write and package SKILL.md skill bundles",
        SKILL_AUTHORING_PROMPT,
    )
    .with_priority(5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_are_unique_and_non_empty() {
        let skills = all();
        let mut ids: Vec<&str> = skills.iter().map(|s| s.id.as_str()).collect();
        assert!(ids.iter().all(|id| !id.is_empty()));
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), skills.len());
    }

    #[test]
    fn test_builtin_prompts_start_with_heading() {
        for skill in all() {
            assert!(skill.system_prompt.starts_with("## "), "{}", skill.id);
            assert!(skill.enabled);
        }
    }
}
