//! Shared-view composer.
//!
//! Assembles one self-contained public HTML document from the content
//! document: cover (if any), a table of contents linking to chapter
//! anchors, one section per chapter with the sanitized body, and an
//! interactive quiz block scored entirely client-side.
//!
//! Cover and quiz classification go through the exact same model logic as
//! the PDF/DOCX paths ([`prepare`] and [`quiz::extract_quiz`]), so the
//! three output formats never disagree about what a chapter is.

use std::io::{Seek, Write};

use chrono::Local;
use html_escape::encode_text;

use super::{Exporter, prepare};
use crate::error::Result;
use crate::model::{ContentDocument, quiz};

/// Configuration for shared-view export.
#[derive(Debug, Clone, Default)]
pub struct SharedViewConfig {
    /// Page title and heading of the shared document.
    pub title: String,
}

impl SharedViewConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

/// Standalone shared-page exporter.
#[derive(Debug, Clone, Default)]
pub struct SharedViewExporter {
    config: SharedViewConfig,
}

impl SharedViewExporter {
    /// Create a new exporter with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the exporter with custom settings.
    pub fn with_config(mut self, config: SharedViewConfig) -> Self {
        self.config = config;
        self
    }

    /// Compose the shared page as a string (the `export` method writes the
    /// same bytes to a writer).
    pub fn compose(&self, doc: &ContentDocument) -> String {
        let (cover_src, chapters) = prepare(doc);
        let title = encode_text(&self.config.title);

        let mut body = String::new();

        if let Some(src) = cover_src {
            body.push_str(&format!(
                "<div class=\"cover\"><img src=\"{}\" alt=\"Cover\"></div>\n",
                html_escape::encode_double_quoted_attribute(&src)
            ));
        }

        body.push_str(&format!("<h1 class=\"doc-title\">{title}</h1>\n"));

        body.push_str("<nav class=\"toc\"><h2>Contents</h2><ol>\n");
        for chapter in &chapters {
            body.push_str(&format!(
                "<li><a href=\"#chapter-{}\">{}</a></li>\n",
                chapter.ordinal,
                encode_text(&chapter.title)
            ));
        }
        body.push_str("</ol></nav>\n");

        for chapter in &chapters {
            body.push_str(&format!(
                "<section id=\"chapter-{}\" class=\"chapter\">\n",
                chapter.ordinal
            ));
            // body_html is sanitized with the shared quiz block stripped;
            // the interactive rendering is re-attached below in its own
            // container.
            body.push_str(&chapter.body_html);

            if let Some(q) = &chapter.quiz {
                body.push_str(&format!(
                    "<div class=\"quiz\" data-chapter=\"{}\">\n{}\n<button class=\"quiz-score\">Check answers</button>\n<p class=\"quiz-result\" hidden></p>\n</div>\n",
                    chapter.ordinal, q.shared_content
                ));
            } else {
                // Legacy documents stored quizzes as flat text lines; parse
                // the extracted paragraph text, not the raw markup.
                let text: String = chapter
                    .nodes
                    .iter()
                    .filter_map(|n| match n {
                        crate::extract::Node::Paragraph { text, .. } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                let flat = quiz::parse_flat_quiz(&text);
                if !flat.is_empty() {
                    body.push_str("<div class=\"quiz legacy\"><h2>Exercises</h2><dl>\n");
                    for fq in &flat {
                        body.push_str(&format!(
                            "<dt>Question {}: {}</dt><dd class=\"answer\" hidden>{}</dd>\n",
                            fq.number,
                            encode_text(&fq.question),
                            encode_text(&fq.answer)
                        ));
                    }
                    body.push_str("</dl></div>\n");
                }
            }
            body.push_str("</section>\n");
        }

        let date = Local::now().format("%B %e, %Y").to_string();
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n<title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<main>\n{body}</main>\n<footer>Generated on {date}</footer>\n<script>{SCRIPT}</script>\n</body>\n</html>\n"
        )
    }
}

impl Exporter for SharedViewExporter {
    fn export<W: Write + Seek>(&self, doc: &ContentDocument, writer: &mut W) -> Result<()> {
        writer.write_all(self.compose(doc).as_bytes())?;
        Ok(())
    }
}

const STYLE: &str = r#"
body{font-family:Georgia,serif;margin:0;background:#faf9f6;color:#222}
main{max-width:760px;margin:0 auto;padding:2rem 1rem}
.cover img{display:block;max-width:40%;margin:2rem auto}
.doc-title{text-align:center;font-size:2.2rem}
.toc ol{line-height:1.8}
.toc a{color:#1a4d8f;text-decoration:none}
.chapter{margin-top:3rem;border-top:1px solid #ddd;padding-top:1.5rem}
.chapter img{max-width:100%}
.quiz{margin-top:2rem;padding:1rem;background:#fff;border:1px solid #e0e0e0;border-radius:8px}
.quiz-question{margin:1rem 0;padding:.75rem;border:1px solid #eee;border-radius:6px}
.flash-card{cursor:pointer;perspective:600px}
.flash-card .back{display:none}
.flash-card.flipped .front{display:none}
.flash-card.flipped .back{display:block}
.short-answer .answer,.legacy .answer{display:none}
.short-answer.revealed .answer,.legacy dt.revealed+dd{display:block}
.legacy dt{cursor:pointer;font-weight:bold;margin-top:.5rem}
.mc-option{display:block;cursor:pointer;padding:.25rem .5rem;border-radius:4px}
.mc-option.selected{background:#dbe9ff}
.mc-option.correct{background:#d4f4d7}
.mc-option.incorrect{background:#ffd9d9}
.quiz-score{margin-top:1rem;padding:.5rem 1rem;cursor:pointer}
footer{text-align:center;color:#888;padding:2rem 0}
"#;

const SCRIPT: &str = r#"
document.querySelectorAll('.flash-card').forEach(function(card){
  card.addEventListener('click',function(){card.classList.toggle('flipped');});
});
document.querySelectorAll('.short-answer').forEach(function(q){
  q.addEventListener('click',function(){q.classList.add('revealed');});
});
document.querySelectorAll('.legacy dt').forEach(function(dt){
  dt.addEventListener('click',function(){
    dt.classList.toggle('revealed');
    var dd=dt.nextElementSibling;
    if(dd){dd.hidden=!dd.hidden;}
  });
});
document.querySelectorAll('.mc-option').forEach(function(opt){
  opt.addEventListener('click',function(){
    var q=opt.closest('.quiz-question');
    if(q){q.querySelectorAll('.mc-option').forEach(function(o){o.classList.remove('selected');});}
    opt.classList.add('selected');
  });
});
document.querySelectorAll('.quiz-score').forEach(function(btn){
  btn.addEventListener('click',function(){
    var quiz=btn.closest('.quiz');
    var total=0,correct=0;
    quiz.querySelectorAll('.quiz-question').forEach(function(q){
      var options=q.querySelectorAll('.mc-option');
      if(!options.length){return;}
      total++;
      options.forEach(function(o){o.classList.remove('correct','incorrect');});
      var sel=q.querySelector('.mc-option.selected');
      if(sel){
        if(sel.dataset.correct==='true'){sel.classList.add('correct');correct++;}
        else{sel.classList.add('incorrect');}
      }
    });
    var result=quiz.querySelector('.quiz-result');
    if(result&&total>0){
      result.hidden=false;
      result.textContent='Score: '+correct+' / '+total;
    }
  });
});
"#;
