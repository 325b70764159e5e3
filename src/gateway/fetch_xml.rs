use uuid::Uuid;

/// Solutions (visible only) that contain the component with `object_id`, with the
/// component's root behavior pulled in through the `sc` link alias.
pub fn solutions_containing(object_id: &Uuid) -> String {
    format!(
        r#"<fetch version="1.0" mapping="logical">
  <entity name="solution">
    <attribute name="solutionid" />
    <attribute name="createdon" />
    <attribute name="description" />
    <attribute name="friendlyname" />
    <attribute name="uniquename" />
    <attribute name="ismanaged" />
    <attribute name="version" />
    <filter>
      <condition attribute="isvisible" operator="eq" value="1" />
    </filter>
    <link-entity name="solutioncomponent" from="solutionid" to="solutionid" alias="sc">
      <attribute name="rootcomponentbehavior" />
      <filter>
        <condition attribute="objectid" operator="eq" value="{object_id}" />
      </filter>
    </link-entity>
  </entity>
</fetch>"#
    )
}
