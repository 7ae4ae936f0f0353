use super::questions::{Question, RUBRIC};
use std::fmt::Write;

const HEAD: &str = r#"<script src="https://assets.crowd.aws/crowd-html-elements.js"></script>
<style>
  .video-block { margin-bottom: 48px; }
  .video-block iframe { display: block; margin-bottom: 16px; }
  fieldset { margin-bottom: 16px; }
  fieldset label { display: block; margin: 4px 0; }
</style>
<crowd-form answer-format="flatten-objects">
  <h1>Surgical Skill Assessment</h1>
  <p>Watch each video below, then rate the surgeon on every question for that video.</p>
"#;

const TAIL: &str = "</crowd-form>\n";

/// Marketplace layout parameter for the i-th video URL.
pub fn placeholder(index: usize) -> String {
    format!("${{video_url_{}}}", index)
}

/// Form field name for one question about one video.
pub fn field_name(video_index: usize, question: &Question) -> String {
    format!("video_{}_{}", video_index, question.slug())
}

/// Survey form with `num_videos` player slots, each followed by the rubric.
pub fn render(num_videos: usize) -> String {
    let mut html = String::from(HEAD);
    for i in 0..num_videos {
        render_video_block(&mut html, i);
    }
    html.push_str(TAIL);
    html
}

fn render_video_block(html: &mut String, index: usize) {
    // Writing to a String can't fail.
    let _ = writeln!(html, "  <div class=\"video-block\">");
    let _ = writeln!(html, "    <h2>Video {}</h2>", index + 1);
    let _ = writeln!(
        html,
        "    <iframe width=\"560\" height=\"315\" src=\"{}\" frameborder=\"0\" allowfullscreen></iframe>",
        placeholder(index)
    );
    for question in &RUBRIC {
        let name = field_name(index, question);
        let _ = writeln!(html, "    <fieldset>");
        let _ = writeln!(html, "      <legend>{}</legend>", escape(question.title));
        for (score, option) in question.options.iter().enumerate() {
            let _ = writeln!(
                html,
                "      <label><input type=\"radio\" name=\"{}\" value=\"{}\" required> {}</label>",
                name,
                score + 1,
                escape(option)
            );
        }
        let _ = writeln!(html, "    </fieldset>");
    }
    let _ = writeln!(html, "  </div>");
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
