const HTML_QUESTION_SCHEMA: &str =
    "http://mechanicalturk.amazonaws.com/AWSMechanicalTurkDataSchemas/2011-11-11/HTMLQuestion.xsd";

/// Wrap survey HTML in an HTMLQuestion document. A frame height of 0 lets the
/// worker site size the frame to the content.
pub fn html_question(html: &str) -> String {
    // "]]>" would end the CDATA section early; split it across two sections.
    let html = html.replace("]]>", "]]]]><![CDATA[>");
    format!(
        "<HTMLQuestion xmlns=\"{}\">\n  <HTMLContent><![CDATA[<!DOCTYPE html>{}]]></HTMLContent>\n  <FrameHeight>0</FrameHeight>\n</HTMLQuestion>\n",
        HTML_QUESTION_SCHEMA, html
    )
}
