//! # Technical SEO Payload Builder
//!
//! A pure, deterministic derivation from the assembled article: a schema.org
//! `@graph` document plus the WordPress post payload. No network calls, no
//! randomness — the output is regenerated whenever the article changes.

use crate::text::slugify;
use crate::types::{Article, AppSettings, TechnicalSeo, WpPostPayload, WpSeoMeta};
use serde_json::{json, Value};

/// Builds the structured-data graph and the CMS post payload.
///
/// The post status is always `"draft"`: pushing content live is a human
/// decision, never the pipeline's.
pub fn build_technical_seo(article: &Article, settings: &AppSettings) -> TechnicalSeo {
    let site_url = normalize_site_url(settings, article);
    let slug = if article.seo.slug.is_empty() {
        slugify(&article.request.target_keyword)
    } else {
        article.seo.slug.clone()
    };
    let page_url = format!("{site_url}/{slug}/");

    let graph = build_graph(article, &site_url, &page_url);
    let schema_json_ld = json!({
        "@context": "https://schema.org",
        "@graph": graph,
    })
    .to_string();

    let post_payload = WpPostPayload {
        title: article.structure.title.clone(),
        content: article.html_content.clone(),
        status: "draft".to_string(),
        slug,
        excerpt: article.seo.viral_excerpt.clone(),
        tags: article.seo.tags.clone(),
        meta: WpSeoMeta {
            seo_title: article.seo.seo_title.clone(),
            meta_description: article.seo.meta_description.clone(),
            focus_keyword: article.seo.target_keyword.clone(),
        },
    };

    TechnicalSeo {
        schema_json_ld,
        post_payload,
    }
}

fn normalize_site_url(settings: &AppSettings, article: &Article) -> String {
    let raw = article
        .request
        .site_url
        .clone()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| settings.default_site_url.clone());
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "https://example.com".to_string()
    } else {
        trimmed.to_string()
    }
}

fn build_graph(article: &Article, site_url: &str, page_url: &str) -> Vec<Value> {
    let organization_id = format!("{site_url}/#organization");
    let website_id = format!("{site_url}/#website");
    let image_id = format!("{page_url}#primaryimage");
    let breadcrumb_id = format!("{page_url}#breadcrumb");
    let article_id = format!("{page_url}#article");

    let primary_image_url = article
        .media
        .image_specs
        .first()
        .and_then(|spec| spec.rendered_url.clone());

    let mut graph = vec![
        json!({
            "@type": "Organization",
            "@id": organization_id,
            "name": site_name(site_url),
            "url": site_url,
        }),
        json!({
            "@type": "WebSite",
            "@id": website_id,
            "url": site_url,
            "publisher": { "@id": organization_id },
        }),
        json!({
            "@type": "BreadcrumbList",
            "@id": breadcrumb_id,
            "itemListElement": [
                { "@type": "ListItem", "position": 1, "name": "Home", "item": site_url },
                { "@type": "ListItem", "position": 2, "name": article.structure.title },
            ],
        }),
    ];

    if let Some(url) = &primary_image_url {
        graph.push(json!({
            "@type": "ImageObject",
            "@id": image_id,
            "url": url,
            "contentUrl": url,
        }));
    }

    let mut article_node = json!({
        "@type": "Article",
        "@id": article_id,
        "headline": article.seo.seo_title,
        "description": article.seo.meta_description,
        "keywords": article.seo.tags.join(", "),
        "inLanguage": article.request.language,
        "datePublished": article.created_at.to_rfc3339(),
        "dateModified": article.updated_at.to_rfc3339(),
        "mainEntityOfPage": page_url,
        "isPartOf": { "@id": website_id },
        "publisher": { "@id": organization_id },
    });
    if primary_image_url.is_some() {
        article_node["image"] = json!({ "@id": image_id });
    }
    graph.push(article_node);

    if let Some(video) = &article.video {
        graph.push(json!({
            "@type": "VideoObject",
            "@id": format!("{page_url}#video"),
            "name": video.title,
            "description": video.caption,
            "thumbnailUrl": video.thumbnail_url,
            "embedUrl": format!("https://www.youtube-nocookie.com/embed/{}", video.video_id),
            "contentUrl": video.watch_url,
        }));
    }

    if !article.analysis.paa_questions.is_empty() {
        let main_entity: Vec<Value> = article
            .analysis
            .paa_questions
            .iter()
            .map(|question| {
                json!({
                    "@type": "Question",
                    "name": question,
                    "acceptedAnswer": {
                        "@type": "Answer",
                        "text": article.seo.opportunities.featured_snippet,
                    },
                })
            })
            .collect();
        graph.push(json!({
            "@type": "FAQPage",
            "@id": format!("{page_url}#faq"),
            "mainEntity": main_entity,
        }));
    }

    graph
}

fn site_name(site_url: &str) -> String {
    site_url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.")
        .to_string()
}
