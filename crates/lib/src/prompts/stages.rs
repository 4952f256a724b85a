// --- Competitive Analysis ---

pub const ANALYSIS_PROMPT: &str = r#"You are an SEO strategist. Research the current search results for the keyword "{keyword}" (content language: {language}).
Return ONLY a valid JSON object with these keys:
- "competitor_titles": the titles of the top-ranking pages, strongest first (array of strings)
- "content_gaps": topics the top results fail to cover well (array of strings)
- "paa_questions": real "People Also Ask" questions for this keyword (array of strings)
- "lsi_keywords": semantically related terms to weave into the content (array of strings)
- "strategy_summary": two or three sentences on how to outrank the current results (string)
Do not include any other text or explanations."#;

// --- Structure ---

pub const STRUCTURE_PROMPT: &str = r#"You are a senior editor. Plan an article about "{topic}" targeting the keyword "{keyword}", written in {language}.

# Competitive context
{analysis}

Return ONLY a valid JSON object with these keys:
- "title": a headline of AT MOST {title_word_limit} words that contains the exact keyword "{keyword}"
- "subtitle": a supporting subtitle expanding on the title
- "lead": an opening paragraph of 2-4 sentences; the keyword "{keyword}" must appear in the first sentence
Do not include any other text or explanations."#;

// --- Body ---

pub const BODY_PROMPT: &str = r#"You are an expert content writer. Write the full body of an article in {language} of about {word_count} words.

Title: {title}
Subtitle: {subtitle}
Lead paragraph: {lead}
Target keyword: {keyword}
Semantic terms to include naturally: {lsi_keywords}

Strict output rules:
1. Return ONLY an HTML fragment. No markdown, no <html>, <head> or <body> tags.
2. Wrap everything in exactly ONE <article> element. Start with an <h1> containing the title, then the lead paragraph.
3. Use <h2> sections and <h3> subsections. Do NOT include a table of contents unless instructed below.
4. Never nest <p> tags.
5. End with a references section: <section id="authority-references"><h2>References</h2>...</section> citing 3-5 real high-authority external sources as links. Include it exactly once.
{extra_rules}"#;

pub const BODY_RULE_TOC: &str =
    "Add a linked table of contents <nav> right after the lead paragraph.";
pub const BODY_RULE_GLOSSARY: &str =
    "Add a short glossary section (<dl>) defining the key technical terms before the references.";
pub const BODY_RULE_TABLES: &str =
    "Present comparative data in at least one <table> with a header row.";
pub const BODY_RULE_LISTS: &str =
    "Prefer <ul>/<ol> lists for enumerations and step-by-step instructions.";
pub const BODY_RULE_SECURE_SOURCES: &str =
    "Cite only HTTPS sources from established institutions in the references section.";
pub const BODY_RULE_AUTHOR_CREDIT: &str =
    "Close the article with a one-paragraph author credit: {author_credit}.";

// --- Internal link discovery ---

pub const INTERNAL_LINKS_PROMPT: &str = r#"Search the web for pages on the site {domain} that are relevant to "{keyword}".
Return ONLY a valid JSON array of up to {count} objects, each with:
- "url": the full page URL (must be on {domain})
- "title": the page title
Do not include any other text or explanations."#;

// --- Media strategy ---

pub const MEDIA_STRATEGY_PROMPT: &str = r#"You are an art director planning media for an article titled "{title}" targeting the keyword "{keyword}" ({language}).
Return ONLY a valid JSON object with these keys:
- "video_search_query": a short search query (in English) for one highly relevant YouTube video
- "image_specs": an array of EXACTLY {image_count} objects, in this order of roles: "hero" (16:9), "social" (1:1), "feed" (4:3), "detail" (9:16). Each object has:
  - "role": one of "hero", "social", "feed", "detail"
  - "aspect_ratio": the ratio listed for that role, as a string
  - "prompt": a detailed photorealistic image prompt in English (lighting, lens, composition; no text overlays)
  - "alt_text": descriptive alt text in {language}
  - "title": a short image title in {language}
  - "caption": a one-sentence caption in {language}
  - "filename": an SEO-safe lowercase slug ending in .jpg
Do not include any other text or explanations."#;

// --- Video lookup ---

pub const VIDEO_LOOKUP_PROMPT: &str = r#"Search YouTube for: {query}
Pick the single most relevant, reputable video and return ONLY a valid JSON object with these keys:
- "title": the video title
- "channel": the channel name
- "url": the canonical https://www.youtube.com/watch?v=... URL
- "caption": a one-sentence caption describing why the video is relevant
- "alt_text": short descriptive alt text for the video thumbnail
Do not include any other text or explanations."#;

// --- Metadata ---

pub const METADATA_PROMPT: &str = r#"You are an SEO specialist. Produce metadata for an article about "{topic}" targeting the keyword "{keyword}" ({language}).

# Article opening
{body_excerpt}

Return ONLY a valid JSON object with these keys:
- "seo_title": at most 60 characters, starting with or containing "{keyword}"
- "meta_description": at most 156 characters; "{keyword}" must appear within the first 100 characters
- "slug": a lowercase URL slug built from the keyword
- "synonyms": EXACTLY {synonym_count} keyword variations (array of strings)
- "related_keyphrase": one closely related keyphrase
- "tags": EXACTLY {tag_count} post tags (array of strings)
- "lsi_keywords": semantically related terms used in the article (array of strings)
- "opportunities": an object with "featured_snippet" (a 40-55 word direct answer), "paa" (array of question strings), "news_angle" (string)
- "viral_excerpt": a social sharing hook of at most 180 characters
Do not include any other text or explanations."#;
